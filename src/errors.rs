// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for zone synchronization.
//!
//! This module provides specialized error types for:
//! - rndc control binary invocations (spawn failures, timeouts, non-zero exits)
//! - Zone file generation and removal
//! - Mirroring the BIND9 new-zone registry file
//! - Directory service lookups
//!
//! [`SyncError`] is the composite error returned by the synchronizer, the startup
//! reconciler, and the backend facade.

use std::path::PathBuf;
use thiserror::Error;

use crate::bind9::rndc::is_zone_not_found;

/// Errors produced while running the rndc control binary.
#[derive(Error, Debug)]
pub enum ControlError {
    /// The control binary could not be started at all
    #[error("Failed to execute '{binary}' for rndc {command}: {source}")]
    Spawn {
        /// Binary that was executed
        binary: String,
        /// rndc operation (e.g., "reload", "addzone")
        command: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The control binary did not exit within the configured timeout
    ///
    /// The child process is killed when the timeout fires.
    #[error("rndc {command} for zone '{zone}' timed out after {timeout_secs}s")]
    Timeout {
        /// rndc operation
        command: String,
        /// Zone the command targeted
        zone: String,
        /// Timeout that elapsed
        timeout_secs: u64,
    },

    /// The control binary exited with a non-zero status
    ///
    /// `stderr` holds the diagnostic text printed by rndc, which callers classify
    /// (see [`ControlError::is_zone_not_found`]).
    #[error("rndc {command} for zone '{zone}' failed (exit status {}): {stderr}", .status.map_or_else(|| "signal".to_string(), |s| s.to_string()))]
    Failed {
        /// rndc operation
        command: String,
        /// Zone the command targeted
        zone: String,
        /// Exit code, `None` when terminated by a signal
        status: Option<i32>,
        /// Captured standard error of the process
        stderr: String,
    },
}

impl ControlError {
    /// Returns true when rndc reported that the zone is not loaded on the server.
    #[must_use]
    pub fn is_zone_not_found(&self) -> bool {
        match self {
            Self::Failed { stderr, .. } => is_zone_not_found(stderr),
            Self::Spawn { .. } | Self::Timeout { .. } => false,
        }
    }

    /// Diagnostic text captured from the control binary, if any.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            Self::Spawn { .. } | Self::Timeout { .. } => None,
        }
    }
}

/// Errors produced while writing or removing zone files.
#[derive(Error, Debug)]
pub enum ZoneFileError {
    /// The zone file to remove does not exist
    ///
    /// Deleting a zone whose file is already gone is a precondition failure, since
    /// the server's registry may still reference the file.
    #[error("Zone file {} does not exist", .path.display())]
    MissingZoneFile {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// The zone's `name_id` stem cannot be used as a file name
    #[error("Zone '{name}' ({id}) does not produce a safe file name")]
    UnsafeFileName {
        /// Zone name
        name: String,
        /// Zone id
        id: String,
    },

    /// The zone file path cannot be quoted in an `addzone` definition
    #[error("Zone file path {} cannot be used in an addzone definition", .path.display())]
    UnsafePath {
        /// Offending zone file path
        path: PathBuf,
    },

    /// Creating the zone output directory failed
    #[error("Failed to create zone directory {}: {source}", .path.display())]
    CreateDirectory {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing or renaming the zone file failed
    #[error("Failed to write zone file {}: {source}", .path.display())]
    Write {
        /// Destination zone file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Removing the zone file failed
    #[error("Failed to remove zone file {}: {source}", .path.display())]
    Remove {
        /// Zone file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced while mirroring the BIND9 registry (`.nzf`) file.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The configured glob pattern is not valid
    #[error("Invalid registry pattern '{pattern}': {source}")]
    Pattern {
        /// Full pattern that failed to parse
        pattern: String,
        /// Parse error
        #[source]
        source: glob::PatternError,
    },

    /// No registry file matched the pattern
    #[error("No registry file matches '{pattern}'")]
    NoMatch {
        /// Full pattern that was searched
        pattern: String,
    },

    /// More than one registry file matched and strict matching is enabled
    #[error("Registry pattern '{pattern}' matched {count} files; expected exactly one")]
    Ambiguous {
        /// Full pattern that was searched
        pattern: String,
        /// Number of matching files
        count: usize,
    },

    /// Reading the registry directory failed
    #[error("Failed to read registry candidates for '{pattern}': {source}")]
    Read {
        /// Full pattern that was searched
        pattern: String,
        /// Underlying glob error
        #[source]
        source: glob::GlobError,
    },

    /// The blocking registry lookup task did not complete
    #[error("Registry lookup for '{pattern}' did not complete: {source}")]
    Lookup {
        /// Full pattern that was searched
        pattern: String,
        /// Task join error
        #[source]
        source: tokio::task::JoinError,
    },

    /// Copying the registry file to the mirror destination failed
    #[error("Failed to copy registry {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        /// Source registry file
        from: PathBuf,
        /// Mirror destination
        to: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by a directory service.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The directory document could not be read
    #[error("Failed to read directory document {}: {source}", .path.display())]
    Read {
        /// Document path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The directory document could not be parsed
    #[error("Failed to parse directory document {}: {reason}", .path.display())]
    Parse {
        /// Document path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A lookup referenced a zone the directory does not know
    #[error("Zone '{zone_id}' not found in directory")]
    ZoneNotFound {
        /// Zone id that was requested
        zone_id: String,
    },

    /// The directory backend is unavailable
    #[error("Directory service unavailable: {0}")]
    Unavailable(String),
}

/// Composite error for synchronization operations.
///
/// Every error except a "zone not found" reload during startup reconciliation
/// is propagated to the caller through this type.
#[derive(Error, Debug)]
pub enum SyncError {
    /// rndc invocation failed
    #[error(transparent)]
    Control(#[from] ControlError),

    /// Zone file could not be written or removed
    #[error(transparent)]
    ZoneFile(#[from] ZoneFileError),

    /// Registry mirror failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Directory service lookup failed
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl SyncError {
    /// Short category name, used as a metrics label and in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Control(ControlError::Spawn { .. }) => "ControlSpawnFailed",
            Self::Control(ControlError::Timeout { .. }) => "ControlTimeout",
            Self::Control(ControlError::Failed { .. }) => "ControlFailed",

            Self::ZoneFile(ZoneFileError::MissingZoneFile { .. }) => "MissingZoneFile",
            Self::ZoneFile(ZoneFileError::UnsafeFileName { .. }) => "UnsafeZoneFileName",
            Self::ZoneFile(ZoneFileError::UnsafePath { .. }) => "UnsafeZoneFilePath",
            Self::ZoneFile(ZoneFileError::CreateDirectory { .. }) => "ZoneDirectoryFailed",
            Self::ZoneFile(ZoneFileError::Write { .. }) => "ZoneFileWriteFailed",
            Self::ZoneFile(ZoneFileError::Remove { .. }) => "ZoneFileRemoveFailed",

            Self::Registry(RegistryError::Pattern { .. }) => "RegistryPatternInvalid",
            Self::Registry(RegistryError::NoMatch { .. }) => "RegistryNotFound",
            Self::Registry(RegistryError::Ambiguous { .. }) => "RegistryAmbiguous",
            Self::Registry(RegistryError::Read { .. } | RegistryError::Lookup { .. }) => {
                "RegistryReadFailed"
            }
            Self::Registry(RegistryError::Copy { .. }) => "RegistryCopyFailed",

            Self::Directory(_) => "DirectoryFailed",
        }
    }
}
