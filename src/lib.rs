// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # bind9-sync - zone file and rndc reconciliation for BIND9
//!
//! bind9-sync keeps an authoritative BIND9 server consistent with a control
//! plane. Each zone, record set, or record change regenerates the zone's file,
//! tells BIND9 to add or reload it through rndc, and mirrors BIND9's new-zone
//! registry to disk.
//!
//! ## Modules
//!
//! - [`backend`] - Lifecycle entry points (create/update/delete zone, record set, record)
//! - [`reconcilers`] - Zone synchronization, per-zone locking, startup reconciliation
//! - [`bind9`] - rndc invocation, zone file writing, registry mirroring
//! - [`directory`] - Control plane types and the file-backed directory
//! - [`config`] - Driver settings
//! - [`errors`] - Error types
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use bind9_sync::backend::Bind9Backend;
//! use bind9_sync::config::Settings;
//! use bind9_sync::directory::FileDirectory;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::load(Path::new("/etc/bind9-sync/settings.yaml"))?;
//! let directory = Arc::new(FileDirectory::load(Path::new("/etc/bind9-sync/zones.yaml"))?);
//! let backend = Bind9Backend::from_settings(&settings, directory.clone());
//!
//! // Reload every zone, recreating any BIND9 has lost
//! backend.start().await?;
//!
//! if let Some(zone) = directory.zone_by_name("example.com.") {
//!     backend.update_domain(&zone).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod bind9;
pub mod config;
pub mod constants;
pub mod directory;
pub mod errors;
pub mod metrics;
pub mod reconcilers;
