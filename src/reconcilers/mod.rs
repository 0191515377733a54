// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation between the control plane and BIND9.
//!
//! # Available Reconcilers
//!
//! - [`DomainSynchronizer::sync_domain`] - Writes a zone file and adds or reloads the zone
//! - [`DomainSynchronizer::sync_delete_domain`] - Removes a zone file and deletes the zone
//! - [`reconcile_startup`] - Reloads every known zone, recreating missing ones
//!
//! # Example
//!
//! ```rust,no_run
//! use bind9_sync::bind9::RndcClient;
//! use bind9_sync::config::Settings;
//! use bind9_sync::directory::{FileDirectory, Zone};
//! use bind9_sync::reconcilers::DomainSynchronizer;
//! use std::sync::Arc;
//!
//! async fn create(settings: Settings, zone: Zone) -> anyhow::Result<()> {
//!     let directory = Arc::new(FileDirectory::default());
//!     let rndc = Arc::new(RndcClient::from_settings(&settings));
//!     let synchronizer = DomainSynchronizer::from_settings(&settings, directory, rndc);
//!
//!     synchronizer.sync_domain(&zone, true).await?;
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod locks;
pub mod startup;

pub use domain::{flatten_record_set, DomainSynchronizer};
pub use locks::ZoneLocks;
pub use startup::{reconcile_startup, StartupReport};

#[cfg(test)]
pub(crate) mod test_support;
