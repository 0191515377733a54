// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mirror of the BIND9 new-zone registry.
//!
//! BIND9 records zones added with `rndc addzone` in a `.nzf` file under its cache
//! directory. The file name is derived from the view name, so it is located with a
//! glob. After every successful rndc operation the driver copies it to
//! `<state_path>/bind9/zones.config`.
//!
//! The copy is a best-effort point-in-time snapshot: concurrent synchronizations of
//! different zones may overwrite it in any order.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::RegistryError;

/// Copies the server registry file to the mirror destination.
#[derive(Debug, Clone)]
pub struct RegistryMirror {
    source_dir: PathBuf,
    pattern: String,
    destination: PathBuf,
    strict: bool,
}

impl RegistryMirror {
    /// Create a mirror of the file matching `pattern` in `source_dir`.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        pattern: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            pattern: pattern.into(),
            destination: destination.into(),
            strict: false,
        }
    }

    /// Fail instead of picking the first file when several match.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Mirror destination path.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    fn full_pattern(&self) -> String {
        let dir = self.source_dir.display().to_string();
        format!(
            "{}/{}",
            glob::Pattern::escape(dir.trim_end_matches('/')),
            self.pattern
        )
    }

    /// Find the registry file.
    ///
    /// Matches are sorted; with several matches the first is used unless strict
    /// matching is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error on an invalid pattern, zero matches, or (strict) several matches.
    pub fn locate(&self) -> Result<PathBuf, RegistryError> {
        let pattern = self.full_pattern();
        let entries = glob::glob(&pattern).map_err(|source| RegistryError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        let mut matches = entries
            .filter(|entry| entry.as_ref().map_or(true, |p| p.is_file()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| RegistryError::Read {
                pattern: pattern.clone(),
                source,
            })?;
        matches.sort();

        match matches.len() {
            0 => Err(RegistryError::NoMatch { pattern }),
            1 => Ok(matches.remove(0)),
            count if self.strict => Err(RegistryError::Ambiguous { pattern, count }),
            count => {
                warn!(
                    pattern = %pattern,
                    count = count,
                    chosen = %matches[0].display(),
                    "Several registry files match; using the first"
                );
                Ok(matches.remove(0))
            }
        }
    }

    /// Copy the registry file over the mirror destination.
    ///
    /// Returns the registry file that was copied.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be located or copied.
    pub async fn mirror(&self) -> Result<PathBuf, RegistryError> {
        // glob walks the directory with blocking calls
        let locator = self.clone();
        let source = tokio::task::spawn_blocking(move || locator.locate())
            .await
            .map_err(|source| RegistryError::Lookup {
                pattern: self.full_pattern(),
                source,
            })??;

        if let Some(parent) = self.destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RegistryError::Copy {
                    from: source.clone(),
                    to: self.destination.clone(),
                    source: e,
                })?;
        }

        tokio::fs::copy(&source, &self.destination)
            .await
            .map_err(|e| RegistryError::Copy {
                from: source.clone(),
                to: self.destination.clone(),
                source: e,
            })?;

        debug!(
            from = %source.display(),
            to = %self.destination.display(),
            "Mirrored zone registry"
        );
        Ok(source)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
