// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Startup reconciliation.
//!
//! When the driver starts, every zone known to the control plane is reloaded on
//! the server. A zone the server reports as not found has lost its registration
//! (for example BIND9 restarted without its `.nzf` file) and is recreated from
//! scratch with a full `addzone` synchronization. Any other rndc failure stops
//! reconciliation and is returned to the caller.

use tracing::{debug, info, warn};

use crate::bind9::RndcCommand;
use crate::errors::SyncError;
use crate::metrics;

use super::domain::DomainSynchronizer;

/// What startup reconciliation did to each zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    /// Zones reloaded in place
    pub reloaded: Vec<String>,
    /// Zones missing from the server and recreated
    pub recreated: Vec<String>,
}

/// Reload every known zone, recreating the ones the server does not have.
///
/// Reloads bypass the zone lock and do not regenerate zone files.
///
/// # Errors
///
/// Returns the first error that is not a "zone not found" reload failure, or any
/// error from recreating a missing zone.
pub async fn reconcile_startup(
    synchronizer: &DomainSynchronizer,
) -> Result<StartupReport, SyncError> {
    let zones = synchronizer.directory().find_zones().await?;
    info!(zones = zones.len(), "Reconciling zones with BIND9");

    let mut report = StartupReport::default();

    for zone in zones {
        let command = RndcCommand::Reload {
            zone: zone.name.clone(),
        };

        match synchronizer.control().invoke(&command).await {
            Ok(()) => {
                debug!(zone = %zone.name, "Zone reloaded");
                report.reloaded.push(zone.name);
            }
            Err(e) if e.is_zone_not_found() => {
                warn!(
                    zone = %zone.name,
                    zone_id = %zone.id,
                    "Zone missing from backend, recreating"
                );
                synchronizer.sync_domain(&zone, true).await?;
                metrics::record_zone_recreated();
                report.recreated.push(zone.name);
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        reloaded = report.reloaded.len(),
        recreated = report.recreated.len(),
        "Startup reconciliation complete"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod startup_tests;
