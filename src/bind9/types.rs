// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Types for rndc commands and their failures.

use std::fmt;
use std::path::PathBuf;

use crate::constants::{RNDC_OP_ADDZONE, RNDC_OP_DELZONE, RNDC_OP_RELOAD};

/// An rndc operation issued by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RndcCommand {
    /// `rndc addzone <zone> { type master; file "<path>"; };`
    ///
    /// Registers and loads the zone in one step.
    AddZone {
        /// Zone name
        zone: String,
        /// Absolute path of the zone file
        file: PathBuf,
    },
    /// `rndc reload <zone>`
    Reload {
        /// Zone name
        zone: String,
    },
    /// `rndc delzone <zone>`
    DelZone {
        /// Zone name
        zone: String,
    },
}

impl RndcCommand {
    /// The rndc operation name.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::AddZone { .. } => RNDC_OP_ADDZONE,
            Self::Reload { .. } => RNDC_OP_RELOAD,
            Self::DelZone { .. } => RNDC_OP_DELZONE,
        }
    }

    /// The zone this command targets.
    #[must_use]
    pub fn zone(&self) -> &str {
        match self {
            Self::AddZone { zone, .. } | Self::Reload { zone } | Self::DelZone { zone } => zone,
        }
    }

    /// Arguments following the operation on the command line.
    ///
    /// The inline `addzone` definition is a single argument.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::AddZone { zone, file } => vec![format!(
                "{zone} {{ type master; file \"{}\"; }};",
                file.display()
            )],
            Self::Reload { zone } | Self::DelZone { zone } => vec![zone.clone()],
        }
    }
}

impl fmt::Display for RndcCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation(), self.args().join(" "))
    }
}

/// RNDC command error with structured information.
///
/// Parses BIND9 RNDC error responses in the format:
/// ```text
/// rndc: 'command' failed: error_type
/// error details
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("RNDC command '{command}' failed: {error}")]
pub struct RndcError {
    /// The RNDC command that failed (e.g., "reload", "addzone")
    pub command: String,
    /// The error type (e.g., "not found", "already exists")
    pub error: String,
    /// Additional error details from BIND9
    pub details: Option<String>,
}

impl RndcError {
    /// Parse an RNDC error response.
    ///
    /// Expected format:
    /// ```text
    /// rndc: 'reload' failed: not found
    /// no matching zone 'example.com' in any view
    /// ```
    ///
    /// Returns `None` when the first line is not an rndc failure line.
    #[must_use]
    pub fn parse(response: &str) -> Option<Self> {
        let mut lines = response.lines().skip_while(|l| l.trim().is_empty());
        let first_line = lines.next()?.trim();

        let rest = first_line.strip_prefix("rndc:")?;

        let command_start = rest.find('\'')?;
        let command_end = rest[command_start + 1..].find('\'')?;
        let command = rest[command_start + 1..command_start + 1 + command_end].to_string();

        let failed_pos = rest.find("failed:")?;
        let error = rest[failed_pos + "failed:".len()..].trim().to_string();

        let details = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        let details = if details.is_empty() {
            None
        } else {
            Some(details)
        };

        Some(Self {
            command,
            error,
            details,
        })
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
