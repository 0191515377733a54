// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the bind9-sync driver.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// RNDC Constants
// ============================================================================

/// Default rndc control binary name (resolved through `PATH`)
pub const DEFAULT_RNDC_BINARY: &str = "rndc";

/// Default address of the BIND9 control channel
pub const DEFAULT_RNDC_HOST: &str = "127.0.0.1";

/// Standard RNDC control port
pub const RNDC_PORT: u16 = 953;

/// Default upper bound for a single rndc invocation
pub const DEFAULT_RNDC_TIMEOUT_SECS: u64 = 30;

/// rndc operation that loads a new zone into the server
pub const RNDC_OP_ADDZONE: &str = "addzone";

/// rndc operation that re-reads an existing zone file
pub const RNDC_OP_RELOAD: &str = "reload";

/// rndc operation that unloads a zone from the server
pub const RNDC_OP_DELZONE: &str = "delzone";

/// Diagnostic printed by rndc when a reload targets a zone the server does not have
pub const RNDC_RELOAD_NOT_FOUND: &str = "rndc: 'reload' failed: not found";

// ============================================================================
// Filesystem Layout Constants
// ============================================================================

/// Default directory where BIND9 keeps its `.nzf` new-zone files
pub const DEFAULT_NZF_PATH: &str = "/var/cache/bind";

/// Glob pattern matching the BIND9 new-zone file inside `nzf-path`
pub const DEFAULT_NZF_PATTERN: &str = "*.nzf";

/// Default local state directory
pub const DEFAULT_STATE_PATH: &str = "/var/lib/bind9-sync";

/// Subdirectory of the state path holding generated zone files
pub const ZONE_OUTPUT_SUBDIR: &str = "bind9";

/// Extension of generated zone files
pub const ZONE_FILE_EXTENSION: &str = "zone";

/// File name of the mirrored registry inside the zone output directory
pub const REGISTRY_MIRROR_FILE: &str = "zones.config";

// ============================================================================
// Zone Synchronization Constants
// ============================================================================

/// Minimum delay between writing a zone file and issuing `rndc reload` for it.
///
/// BIND9 only re-reads a zone file when its mtime has moved since the last load,
/// and mtime resolution can be as coarse as one second.
pub const ZONE_RELOAD_DELAY_MILLIS: u64 = 1000;

/// Default `$TTL` for rendered zone files (1 hour)
pub const DEFAULT_ZONE_TTL_SECS: u32 = 3600;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Thread name for Tokio worker threads
pub const TOKIO_THREAD_NAME: &str = "bind9-sync";
