// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! BIND9 building blocks used by the synchronizer.
//!
//! This module provides the three collaborators a zone synchronization drives:
//!
//! - [`rndc`] - running `rndc addzone`, `reload` and `delzone` against the server
//! - [`zone_file`] - rendering zone files and replacing them atomically
//! - [`registry`] - mirroring the server's `.nzf` new-zone registry
//!
//! # Example
//!
//! ```rust,no_run
//! use bind9_sync::bind9::{ControlInvoker, RndcClient, RndcCommand};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let rndc = RndcClient::new("127.0.0.1", 953).with_key_file("/etc/bind/rndc.key");
//!
//! rndc.invoke(&RndcCommand::Reload {
//!     zone: "example.com.".to_string(),
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod registry;
pub mod rndc;
pub mod types;
pub mod zone_file;

pub use registry::RegistryMirror;
pub use rndc::{is_zone_not_found, ControlInvoker, RndcClient};
pub use types::{RndcCommand, RndcError};
pub use zone_file::{Bind9ZoneRenderer, RecordRow, ZoneFileWriter, ZoneRenderer};
