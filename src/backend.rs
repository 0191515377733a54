// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lifecycle entry points called by the control plane.
//!
//! [`Bind9Backend`] is a dispatch table: zone creation adds the zone, zone updates
//! and every record set or record change reload the owning zone, and zone
//! deletion removes it. All logic lives in the [`DomainSynchronizer`].

use std::sync::Arc;
use tracing::info;

use crate::bind9::RndcClient;
use crate::config::Settings;
use crate::directory::{DirectoryService, Record, RecordSet, Zone};
use crate::errors::SyncError;
use crate::reconcilers::{reconcile_startup, DomainSynchronizer, StartupReport};

/// BIND9 backend facade.
#[derive(Clone)]
pub struct Bind9Backend {
    synchronizer: Arc<DomainSynchronizer>,
}

impl Bind9Backend {
    /// Wrap an existing synchronizer.
    #[must_use]
    pub fn new(synchronizer: Arc<DomainSynchronizer>) -> Self {
        Self { synchronizer }
    }

    /// Build a backend that drives the real rndc binary.
    #[must_use]
    pub fn from_settings(settings: &Settings, directory: Arc<dyn DirectoryService>) -> Self {
        let rndc = Arc::new(RndcClient::from_settings(settings));
        Self::new(Arc::new(DomainSynchronizer::from_settings(
            settings, directory, rndc,
        )))
    }

    /// The underlying synchronizer.
    #[must_use]
    pub fn synchronizer(&self) -> &Arc<DomainSynchronizer> {
        &self.synchronizer
    }

    /// Run startup reconciliation.
    ///
    /// # Errors
    ///
    /// See [`reconcile_startup`].
    pub async fn start(&self) -> Result<StartupReport, SyncError> {
        info!("Starting BIND9 backend");
        reconcile_startup(&self.synchronizer).await
    }

    /// Add a new zone to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the synchronization fails.
    pub async fn create_domain(&self, zone: &Zone) -> Result<(), SyncError> {
        info!(zone = %zone.name, "Create domain");
        self.synchronizer.sync_domain(zone, true).await.map(drop)
    }

    /// Regenerate and reload an existing zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the synchronization fails.
    pub async fn update_domain(&self, zone: &Zone) -> Result<(), SyncError> {
        info!(zone = %zone.name, "Update domain");
        self.synchronizer.sync_domain(zone, false).await.map(drop)
    }

    /// Remove a zone from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone file is missing or the deletion fails.
    pub async fn delete_domain(&self, zone: &Zone) -> Result<(), SyncError> {
        info!(zone = %zone.name, "Delete domain");
        self.synchronizer.sync_delete_domain(zone).await
    }

    /// A record set was created in `zone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone reload fails.
    pub async fn create_record_set(
        &self,
        zone: &Zone,
        record_set: &RecordSet,
    ) -> Result<(), SyncError> {
        info!(zone = %zone.name, record_set = %record_set.name, "Create record set");
        self.synchronizer.sync_domain(zone, false).await.map(drop)
    }

    /// A record set was updated in `zone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone reload fails.
    pub async fn update_record_set(
        &self,
        zone: &Zone,
        record_set: &RecordSet,
    ) -> Result<(), SyncError> {
        info!(zone = %zone.name, record_set = %record_set.name, "Update record set");
        self.synchronizer.sync_domain(zone, false).await.map(drop)
    }

    /// A record set was deleted from `zone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone reload fails.
    pub async fn delete_record_set(
        &self,
        zone: &Zone,
        record_set: &RecordSet,
    ) -> Result<(), SyncError> {
        info!(zone = %zone.name, record_set = %record_set.name, "Delete record set");
        self.synchronizer.sync_domain(zone, false).await.map(drop)
    }

    /// A record was created in `record_set`.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone reload fails.
    pub async fn create_record(
        &self,
        zone: &Zone,
        record_set: &RecordSet,
        record: &Record,
    ) -> Result<(), SyncError> {
        info!(
            zone = %zone.name,
            record_set = %record_set.name,
            record = %record.id,
            "Create record"
        );
        self.synchronizer.sync_domain(zone, false).await.map(drop)
    }

    /// A record was updated in `record_set`.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone reload fails.
    pub async fn update_record(
        &self,
        zone: &Zone,
        record_set: &RecordSet,
        record: &Record,
    ) -> Result<(), SyncError> {
        info!(
            zone = %zone.name,
            record_set = %record_set.name,
            record = %record.id,
            "Update record"
        );
        self.synchronizer.sync_domain(zone, false).await.map(drop)
    }

    /// A record was deleted from `record_set`.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone reload fails.
    pub async fn delete_record(
        &self,
        zone: &Zone,
        record_set: &RecordSet,
        record: &Record,
    ) -> Result<(), SyncError> {
        info!(
            zone = %zone.name,
            record_set = %record_set.name,
            record = %record.id,
            "Delete record"
        );
        self.synchronizer.sync_domain(zone, false).await.map(drop)
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod backend_tests;
