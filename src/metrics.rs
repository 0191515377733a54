// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the bind9-sync driver.
//!
//! All metrics use the namespace prefix `bind9_sync_`.
//!
//! # Metrics Categories
//!
//! - **rndc Metrics** - Invocations of the control binary by operation and outcome
//! - **Synchronization Metrics** - Zone create/update/delete synchronizations
//! - **Startup Metrics** - Zones recreated during startup reconciliation
//!
//! # Example
//!
//! ```rust,no_run
//! use bind9_sync::metrics::{gather_metrics, record_sync_success};
//!
//! record_sync_success("update", std::time::Duration::from_secs(1));
//! println!("{}", gather_metrics().unwrap());
//! ```

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics
const METRICS_NAMESPACE: &str = "bind9_sync";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// rndc Metrics
// ============================================================================

/// Total number of rndc invocations by operation and status
///
/// Labels:
/// - `operation`: rndc operation (`addzone`, `reload`, `delzone`)
/// - `status`: Outcome (`success`, `error`)
pub static RNDC_COMMANDS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_rndc_commands_total"),
        "Total number of rndc invocations by operation and status",
    );
    let counter = CounterVec::new(opts, &["operation", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of rndc invocations in seconds
///
/// Labels:
/// - `operation`: rndc operation
pub static RNDC_COMMAND_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_rndc_command_duration_seconds"),
        "Duration of rndc invocations in seconds by operation",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Synchronization Metrics
// ============================================================================

/// Total number of zone synchronizations by kind and status
///
/// Labels:
/// - `kind`: `create`, `update` or `delete`
/// - `status`: Outcome (`success`, `error`)
pub static ZONE_SYNCS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_zone_syncs_total"),
        "Total number of zone synchronizations by kind and status",
    );
    let counter = CounterVec::new(opts, &["kind", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of zone synchronizations in seconds, including lock wait
///
/// Labels:
/// - `kind`: `create`, `update` or `delete`
pub static ZONE_SYNC_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_zone_sync_duration_seconds"),
        "Duration of zone synchronizations in seconds by kind",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 1.5, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of failed synchronizations by kind and error category
///
/// Labels:
/// - `kind`: `create`, `update` or `delete`
/// - `error_type`: [`crate::errors::SyncError::kind`]
pub static ZONE_SYNC_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_zone_sync_errors_total"),
        "Total number of failed zone synchronizations by kind and error category",
    );
    let counter = CounterVec::new(opts, &["kind", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Startup Metrics
// ============================================================================

/// Zones found missing on the server during startup and recreated
pub static ZONES_RECREATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_zones_recreated_total"),
        "Total number of zones recreated during startup reconciliation",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful rndc invocation
pub fn record_rndc_success(operation: &str, duration: Duration) {
    RNDC_COMMANDS_TOTAL
        .with_label_values(&[operation, "success"])
        .inc();
    RNDC_COMMAND_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Record a failed rndc invocation
pub fn record_rndc_error(operation: &str, duration: Duration) {
    RNDC_COMMANDS_TOTAL
        .with_label_values(&[operation, "error"])
        .inc();
    RNDC_COMMAND_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Record a successful zone synchronization
///
/// # Arguments
/// * `kind` - `create`, `update` or `delete`
/// * `duration` - Duration of the synchronization
pub fn record_sync_success(kind: &str, duration: Duration) {
    ZONE_SYNCS_TOTAL.with_label_values(&[kind, "success"]).inc();
    ZONE_SYNC_DURATION_SECONDS
        .with_label_values(&[kind])
        .observe(duration.as_secs_f64());
}

/// Record a failed zone synchronization
///
/// # Arguments
/// * `kind` - `create`, `update` or `delete`
/// * `error_type` - Category of error
/// * `duration` - Duration before failure
pub fn record_sync_error(kind: &str, error_type: &str, duration: Duration) {
    ZONE_SYNCS_TOTAL.with_label_values(&[kind, "error"]).inc();
    ZONE_SYNC_ERRORS_TOTAL
        .with_label_values(&[kind, error_type])
        .inc();
    ZONE_SYNC_DURATION_SECONDS
        .with_label_values(&[kind])
        .observe(duration.as_secs_f64());
}

/// Record a zone recreated during startup reconciliation
pub fn record_zone_recreated() {
    ZONES_RECREATED_TOTAL.inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
