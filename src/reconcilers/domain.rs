// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone synchronization.
//!
//! The [`DomainSynchronizer`] turns the control plane's current view of a zone into
//! a zone file and the matching rndc operation. Every synchronization of a zone
//! runs under that zone's lock:
//!
//! 1. Fetch record sets, then the records of each set, and flatten them into rows
//! 2. Render and atomically replace the zone file
//! 3. `rndc addzone` for new zones, otherwise wait out the reload delay and
//!    `rndc reload`
//! 4. Mirror the server's zone registry
//!
//! Record set and record changes always regenerate the whole file; there is no
//! incremental update.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::bind9::{ControlInvoker, RecordRow, RegistryMirror, RndcCommand, ZoneFileWriter};
use crate::config::Settings;
use crate::constants::ZONE_RELOAD_DELAY_MILLIS;
use crate::directory::{Criteria, DirectoryService, Record, RecordSet, Zone};
use crate::errors::SyncError;
use crate::metrics;

use super::locks::ZoneLocks;

/// Sync kind label for zone creation
const SYNC_CREATE: &str = "create";

/// Sync kind label for zone update
const SYNC_UPDATE: &str = "update";

/// Sync kind label for zone deletion
const SYNC_DELETE: &str = "delete";

/// Project a record set and its records into render rows.
#[must_use]
pub fn flatten_record_set(record_set: &RecordSet, records: &[Record]) -> Vec<RecordRow> {
    records
        .iter()
        .map(|record| RecordRow {
            name: record_set.name.clone(),
            record_type: record_set.record_type.clone(),
            ttl: record_set.ttl,
            priority: record.priority,
            data: record.data.clone(),
        })
        .collect()
}

/// Orchestrates zone file writes, rndc operations and registry mirroring.
pub struct DomainSynchronizer {
    directory: Arc<dyn DirectoryService>,
    control: Arc<dyn ControlInvoker>,
    writer: ZoneFileWriter,
    registry: RegistryMirror,
    locks: ZoneLocks,
    reload_delay: Duration,
}

impl DomainSynchronizer {
    /// Assemble a synchronizer from its collaborators.
    pub fn new(
        directory: Arc<dyn DirectoryService>,
        control: Arc<dyn ControlInvoker>,
        writer: ZoneFileWriter,
        registry: RegistryMirror,
    ) -> Self {
        Self {
            directory,
            control,
            writer,
            registry,
            locks: ZoneLocks::new(),
            reload_delay: Duration::from_millis(ZONE_RELOAD_DELAY_MILLIS),
        }
    }

    /// Build the writer and registry mirror from settings.
    pub fn from_settings(
        settings: &Settings,
        directory: Arc<dyn DirectoryService>,
        control: Arc<dyn ControlInvoker>,
    ) -> Self {
        let writer = ZoneFileWriter::new(settings.zone_output_dir());
        let registry = RegistryMirror::new(
            &settings.nzf_path,
            &settings.nzf_pattern,
            settings.registry_mirror_path(),
        )
        .strict(settings.strict_registry);

        Self::new(directory, control, writer, registry)
    }

    /// The directory service this synchronizer reads from.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn DirectoryService> {
        &self.directory
    }

    /// The rndc invoker.
    #[must_use]
    pub fn control(&self) -> &Arc<dyn ControlInvoker> {
        &self.control
    }

    /// The zone file writer.
    #[must_use]
    pub fn writer(&self) -> &ZoneFileWriter {
        &self.writer
    }

    /// The registry mirror.
    #[must_use]
    pub fn registry(&self) -> &RegistryMirror {
        &self.registry
    }

    /// The per-zone lock registry.
    #[must_use]
    pub fn locks(&self) -> &ZoneLocks {
        &self.locks
    }

    /// Delay enforced between writing a zone file and reloading it.
    #[must_use]
    pub fn reload_delay(&self) -> Duration {
        self.reload_delay
    }

    /// Fetch the zone's record sets and records and flatten them into rows.
    ///
    /// Rows follow record set order, then record order within each set.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory lookup fails.
    pub async fn fetch_record_rows(&self, zone: &Zone) -> Result<Vec<RecordRow>, SyncError> {
        let record_sets = self
            .directory
            .find_record_sets(&Criteria::zone(&zone.id))
            .await?;

        let mut rows = Vec::new();
        for record_set in &record_sets {
            let records = self
                .directory
                .find_records(&Criteria::record_set(&zone.id, &record_set.id))
                .await?;
            rows.extend(flatten_record_set(record_set, &records));
        }

        debug!(
            zone = %zone.name,
            record_sets = record_sets.len(),
            records = rows.len(),
            "Fetched zone records"
        );
        Ok(rows)
    }

    /// Regenerate the zone file and load it on the server.
    ///
    /// With `create` the zone is added with `rndc addzone`; otherwise the zone is
    /// reloaded after the reload delay. Returns the zone file path.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. A failure after the file write leaves the
    /// new file on disk; a later successful reload converges the server.
    pub async fn sync_domain(&self, zone: &Zone, create: bool) -> Result<PathBuf, SyncError> {
        let kind = if create { SYNC_CREATE } else { SYNC_UPDATE };
        let start = Instant::now();

        let _guard = self.locks.acquire(&zone.id).await;
        debug!(zone = %zone.name, zone_id = %zone.id, kind = kind, "Synchronising zone");

        let result = self.sync_domain_locked(zone, create).await;
        record_outcome(kind, start, &result);
        result
    }

    async fn sync_domain_locked(&self, zone: &Zone, create: bool) -> Result<PathBuf, SyncError> {
        let rows = self.fetch_record_rows(zone).await?;
        let path = self.writer.write(zone, &rows).await?;

        let command = if create {
            RndcCommand::AddZone {
                zone: zone.name.clone(),
                file: path.clone(),
            }
        } else {
            // BIND9 only re-reads a zone file whose mtime changed since the last load
            tokio::time::sleep(self.reload_delay).await;
            RndcCommand::Reload {
                zone: zone.name.clone(),
            }
        };

        self.control.invoke(&command).await?;
        self.registry.mirror().await?;

        info!(
            zone = %zone.name,
            zone_id = %zone.id,
            operation = command.operation(),
            records = rows.len(),
            "Zone synchronised"
        );
        Ok(path)
    }

    /// Remove the zone file and unload the zone from the server.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ZoneFileError::MissingZoneFile`] without calling rndc
    /// when the zone file does not exist, or any later step's error.
    pub async fn sync_delete_domain(&self, zone: &Zone) -> Result<(), SyncError> {
        let start = Instant::now();

        let _guard = self.locks.acquire(&zone.id).await;
        debug!(zone = %zone.name, zone_id = %zone.id, "Deleting zone");

        let result = self.sync_delete_domain_locked(zone).await;
        record_outcome(SYNC_DELETE, start, &result);
        result
    }

    async fn sync_delete_domain_locked(&self, zone: &Zone) -> Result<(), SyncError> {
        self.writer.remove(zone).await?;

        self.control
            .invoke(&RndcCommand::DelZone {
                zone: zone.name.clone(),
            })
            .await?;
        self.registry.mirror().await?;

        info!(zone = %zone.name, zone_id = %zone.id, "Zone deleted");
        Ok(())
    }
}

fn record_outcome<T>(kind: &str, start: Instant, result: &Result<T, SyncError>) {
    match result {
        Ok(_) => metrics::record_sync_success(kind, start.elapsed()),
        Err(e) => metrics::record_sync_error(kind, e.kind(), start.elapsed()),
    }
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod domain_tests;
