// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! rndc control binary invocation.
//!
//! [`RndcClient`] builds the command line
//! `rndc -s <host> -p <port> [-c <config>] [-k <key>] <op> [<args>]` and runs it to
//! completion. A non-zero exit is returned as [`ControlError::Failed`] carrying the
//! captured stderr; classifying that text is left to the caller. There are no
//! retries at this layer.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, error};

use super::types::{RndcCommand, RndcError};
use crate::config::Settings;
use crate::constants::{
    DEFAULT_RNDC_BINARY, DEFAULT_RNDC_TIMEOUT_SECS, RNDC_PORT, RNDC_RELOAD_NOT_FOUND,
};
use crate::errors::ControlError;
use crate::metrics;

/// Returns true when rndc diagnostic text reports a reload of a zone the server
/// does not have loaded.
///
/// This is the only place the driver matches on rndc's error phrasing.
#[must_use]
pub fn is_zone_not_found(diagnostic: &str) -> bool {
    diagnostic.contains(RNDC_RELOAD_NOT_FOUND)
}

/// Something that can run rndc operations against the DNS server.
///
/// - In production this is an [`RndcClient`].
/// - Under test a recording fake can stand in.
#[async_trait]
pub trait ControlInvoker: Send + Sync {
    /// Run `command`, waiting for it to complete.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Failed`] with the captured diagnostic when the
    /// command exits non-zero, or a spawn/timeout error.
    async fn invoke(&self, command: &RndcCommand) -> Result<(), ControlError>;
}

/// rndc command-line client.
#[derive(Debug, Clone)]
pub struct RndcClient {
    binary: String,
    host: String,
    port: u16,
    config_file: Option<PathBuf>,
    key_file: Option<PathBuf>,
    timeout: Duration,
}

impl RndcClient {
    /// Create a client for the control channel at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            binary: DEFAULT_RNDC_BINARY.to_string(),
            host: host.into(),
            port,
            config_file: None,
            key_file: None,
            timeout: Duration::from_secs(DEFAULT_RNDC_TIMEOUT_SECS),
        }
    }

    /// Create a client from resolved settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            binary: settings.rndc_binary.clone(),
            host: settings.rndc_host.clone(),
            port: settings.rndc_port,
            config_file: settings.rndc_config_file.clone(),
            key_file: settings.rndc_key_file.clone(),
            timeout: Duration::from_secs(settings.rndc_timeout_secs),
        }
    }

    /// Use a different control binary (name or path).
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Pass `-c <path>` to rndc.
    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Pass `-k <path>` to rndc.
    #[must_use]
    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = Some(path.into());
        self
    }

    /// Bound each invocation by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments shared by every invocation: server, port, config, key.
    #[must_use]
    pub fn base_args(&self) -> Vec<String> {
        let mut args = vec![
            "-s".to_string(),
            self.host.clone(),
            "-p".to_string(),
            self.port.to_string(),
        ];

        if let Some(config_file) = &self.config_file {
            args.push("-c".to_string());
            args.push(config_file.display().to_string());
        }

        if let Some(key_file) = &self.key_file {
            args.push("-k".to_string());
            args.push(key_file.display().to_string());
        }

        args
    }

    /// The full command line for `command`, binary first.
    #[must_use]
    pub fn command_line(&self, command: &RndcCommand) -> Vec<String> {
        let mut line = Vec::with_capacity(8);
        line.push(self.binary.clone());
        line.extend(self.base_args());
        line.push(command.operation().to_string());
        line.extend(command.args());
        line
    }

    async fn run(&self, command: &RndcCommand) -> Result<(), ControlError> {
        let line = self.command_line(command);
        debug!(command = %line.join(" "), "Calling rndc");

        let child = Command::new(&line[0])
            .args(&line[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ControlError::Spawn {
                binary: self.binary.clone(),
                command: command.operation().to_string(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ControlError::Spawn {
                binary: self.binary.clone(),
                command: command.operation().to_string(),
                source,
            })?,
            Err(_) => {
                return Err(ControlError::Timeout {
                    command: command.operation().to_string(),
                    zone: command.zone().to_string(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        // rndc prints some failures on stdout
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };

        Err(ControlError::Failed {
            command: command.operation().to_string(),
            zone: command.zone().to_string(),
            status: output.status.code(),
            stderr,
        })
    }
}

impl Default for RndcClient {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_RNDC_HOST, RNDC_PORT)
    }
}

#[async_trait]
impl ControlInvoker for RndcClient {
    async fn invoke(&self, command: &RndcCommand) -> Result<(), ControlError> {
        let start = Instant::now();
        let result = self.run(command).await;

        match &result {
            Ok(()) => {
                metrics::record_rndc_success(command.operation(), start.elapsed());
            }
            Err(e) => {
                metrics::record_rndc_error(command.operation(), start.elapsed());
                if e.is_zone_not_found() {
                    // Callers decide whether this is fatal
                    debug!(zone = %command.zone(), "rndc reports zone not found");
                } else if let Some(parsed) = e.diagnostic().and_then(RndcError::parse) {
                    error!(
                        command = %parsed.command,
                        zone = %command.zone(),
                        error = %parsed.error,
                        details = parsed.details.as_deref().unwrap_or(""),
                        "rndc command failed"
                    );
                } else {
                    error!(zone = %command.zone(), error = %e, "rndc command failed");
                }
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "rndc_tests.rs"]
mod rndc_tests;
