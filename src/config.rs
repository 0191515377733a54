// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Driver settings.
//!
//! Settings are read from a YAML file whose keys mirror the rndc and BIND9 options
//! of the backend:
//!
//! ```yaml
//! rndc-host: 127.0.0.1
//! rndc-port: 953
//! rndc-key-file: /etc/bind/rndc.key
//! nzf-path: /var/cache/bind
//! state-path: /var/lib/bind9-sync
//! ```
//!
//! Every key is optional and falls back to the defaults in [`crate::constants`].

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_NZF_PATH, DEFAULT_NZF_PATTERN, DEFAULT_RNDC_BINARY, DEFAULT_RNDC_HOST,
    DEFAULT_RNDC_TIMEOUT_SECS, DEFAULT_STATE_PATH, REGISTRY_MIRROR_FILE, RNDC_PORT,
    ZONE_OUTPUT_SUBDIR,
};

/// Resolved configuration for the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Settings {
    /// Address of the BIND9 control channel
    pub rndc_host: String,
    /// Port of the BIND9 control channel
    pub rndc_port: u16,
    /// rndc configuration file (`-c`)
    pub rndc_config_file: Option<PathBuf>,
    /// rndc key file (`-k`)
    pub rndc_key_file: Option<PathBuf>,
    /// rndc binary name or path
    pub rndc_binary: String,
    /// Upper bound for one rndc invocation, in seconds
    pub rndc_timeout_secs: u64,
    /// Directory where BIND9 writes its `.nzf` registry
    pub nzf_path: PathBuf,
    /// Glob matching the registry file inside `nzf_path`
    pub nzf_pattern: String,
    /// Fail when more than one registry file matches
    pub strict_registry: bool,
    /// Local state directory; zone files go in `<state_path>/bind9`
    pub state_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rndc_host: DEFAULT_RNDC_HOST.to_string(),
            rndc_port: RNDC_PORT,
            rndc_config_file: None,
            rndc_key_file: None,
            rndc_binary: DEFAULT_RNDC_BINARY.to_string(),
            rndc_timeout_secs: DEFAULT_RNDC_TIMEOUT_SECS,
            nzf_path: PathBuf::from(DEFAULT_NZF_PATH),
            nzf_pattern: DEFAULT_NZF_PATTERN.to_string(),
            strict_registry: false,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

impl Settings {
    /// Parse settings from YAML text, then validate and resolve them.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or the settings fail validation.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Self =
            serde_yaml::from_str(content).context("Failed to parse settings YAML")?;
        settings.resolve()
    }

    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Validate the settings and make the state path absolute.
    ///
    /// Zone file paths are handed to BIND9 in `addzone`, so they must not depend on
    /// the driver's working directory.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn resolve(mut self) -> Result<Self> {
        self.validate()?;
        self.state_path = std::path::absolute(&self.state_path).with_context(|| {
            format!(
                "Failed to resolve state path {}",
                self.state_path.display()
            )
        })?;
        Ok(self)
    }

    /// Check settings for values rndc or the registry glob cannot use.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.rndc_host.trim().is_empty() {
            bail!("rndc-host must not be empty");
        }
        if self.rndc_port == 0 {
            bail!("rndc-port must be non-zero");
        }
        if self.rndc_binary.trim().is_empty() {
            bail!("rndc-binary must not be empty");
        }
        if self.rndc_timeout_secs == 0 {
            bail!("rndc-timeout-secs must be non-zero");
        }
        if self.nzf_pattern.trim().is_empty() {
            bail!("nzf-pattern must not be empty");
        }
        if self.nzf_pattern.contains('/') {
            bail!("nzf-pattern must be a file name pattern, got '{}'", self.nzf_pattern);
        }
        if self.state_path.to_string_lossy().contains(['"', '\n', '\r']) {
            bail!("state-path must not contain quotes or line breaks");
        }
        glob::Pattern::new(&self.nzf_pattern)
            .with_context(|| format!("nzf-pattern '{}' is not a valid glob", self.nzf_pattern))?;
        Ok(())
    }

    /// Directory holding generated zone files.
    #[must_use]
    pub fn zone_output_dir(&self) -> PathBuf {
        self.state_path.join(ZONE_OUTPUT_SUBDIR)
    }

    /// Path of the mirrored registry file.
    #[must_use]
    pub fn registry_mirror_path(&self) -> PathBuf {
        self.zone_output_dir().join(REGISTRY_MIRROR_FILE)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
