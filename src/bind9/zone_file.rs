// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! BIND9 zone file rendering and writing.
//!
//! Zone files live at `<state_path>/bind9/<name>_<id>.zone`. Every write renders
//! the whole file from the zone and its flattened record rows and replaces the
//! previous file in one rename, so BIND9 never reads a partially written file.
//! The temporary file is synced before the rename and the directory after it, so
//! a crash leaves either the old or the new file on disk.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::constants::{DEFAULT_ZONE_TTL_SECS, ZONE_FILE_EXTENSION};
use crate::directory::Zone;
use crate::errors::ZoneFileError;

/// One record projected for rendering.
///
/// `name`, `record_type` and `ttl` come from the record set; `priority` and `data`
/// from the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    /// Owner name
    pub name: String,
    /// Record type
    pub record_type: String,
    /// TTL in seconds
    pub ttl: Option<u32>,
    /// Priority (MX, SRV)
    pub priority: Option<u32>,
    /// Record data
    pub data: String,
}

/// Renders zone file content.
///
/// Implementations must be pure: the same zone and rows always produce the same bytes.
pub trait ZoneRenderer: Send + Sync {
    /// Render the complete zone file.
    fn render(&self, zone: &Zone, rows: &[RecordRow]) -> Vec<u8>;
}

/// Default renderer producing a BIND9 master file.
///
/// ```text
/// $ORIGIN example.com.
/// $TTL 3600
///
/// www.example.com. 300 IN A 192.0.2.10
/// example.com. 300 IN MX 10 mail.example.com.
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Bind9ZoneRenderer;

impl ZoneRenderer for Bind9ZoneRenderer {
    fn render(&self, zone: &Zone, rows: &[RecordRow]) -> Vec<u8> {
        let mut content = String::new();
        let _ = writeln!(content, "$ORIGIN {}", zone.name);
        let _ = writeln!(
            content,
            "$TTL {}",
            zone.ttl.unwrap_or(DEFAULT_ZONE_TTL_SECS)
        );
        content.push('\n');

        for row in rows {
            content.push_str(&row.name);
            if let Some(ttl) = row.ttl {
                let _ = write!(content, " {ttl}");
            }
            let _ = write!(content, " IN {}", row.record_type);
            if let Some(priority) = row.priority {
                let _ = write!(content, " {priority}");
            }
            let _ = writeln!(content, " {}", row.data);
        }

        content.into_bytes()
    }
}

/// Writes and removes zone files in the zone output directory.
#[derive(Clone)]
pub struct ZoneFileWriter {
    output_dir: PathBuf,
    renderer: Arc<dyn ZoneRenderer>,
}

impl std::fmt::Debug for ZoneFileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneFileWriter")
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl ZoneFileWriter {
    /// Create a writer for `output_dir` using the default renderer.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_renderer(output_dir, Arc::new(Bind9ZoneRenderer))
    }

    /// Create a writer with a custom renderer.
    pub fn with_renderer(output_dir: impl Into<PathBuf>, renderer: Arc<dyn ZoneRenderer>) -> Self {
        Self {
            output_dir: output_dir.into(),
            renderer,
        }
    }

    /// Directory holding the zone files.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the zone file for `zone`.
    #[must_use]
    pub fn zone_file_path(&self, zone: &Zone) -> PathBuf {
        self.output_dir
            .join(format!("{}.{ZONE_FILE_EXTENSION}", zone.file_stem()))
    }

    /// The zone's file path, if both the stem and the path can be embedded in an
    /// `addzone` definition.
    fn checked_path(&self, zone: &Zone) -> Result<PathBuf, ZoneFileError> {
        let stem = zone.file_stem();
        let unsafe_name = zone.name.is_empty()
            || zone.id.is_empty()
            || stem.starts_with('.')
            || stem.contains(is_unsafe_stem_char);
        if unsafe_name {
            return Err(ZoneFileError::UnsafeFileName {
                name: zone.name.clone(),
                id: zone.id.clone(),
            });
        }

        let path = self.zone_file_path(zone);
        if path.to_string_lossy().contains(['"', '\n', '\r']) {
            return Err(ZoneFileError::UnsafePath { path });
        }
        Ok(path)
    }

    /// Render `rows` for `zone` and atomically replace its zone file.
    ///
    /// The output directory is created if missing. Content goes to a temporary file
    /// in the same directory first, is synced, and is renamed over the destination.
    /// A temporary file left by a failed write is removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone name is unsafe or any filesystem step fails.
    pub async fn write(&self, zone: &Zone, rows: &[RecordRow]) -> Result<PathBuf, ZoneFileError> {
        let path = self.checked_path(zone)?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| ZoneFileError::CreateDirectory {
                path: self.output_dir.clone(),
                source,
            })?;

        let content = self.renderer.render(zone, rows);
        let tmp_path = self
            .output_dir
            .join(format!(".{}.{ZONE_FILE_EXTENSION}.tmp", zone.file_stem()));

        let write_err = |source| ZoneFileError::Write {
            path: path.clone(),
            source,
        };

        if let Err(e) = replace_file(&tmp_path, &path, &content).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(write_err(e));
        }
        sync_dir(&self.output_dir).await.map_err(write_err)?;

        debug!(
            zone = %zone.name,
            path = %path.display(),
            records = rows.len(),
            bytes = content.len(),
            "Wrote zone file"
        );
        Ok(path)
    }

    /// Remove the zone file for `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneFileError::MissingZoneFile`] if the file does not exist.
    pub async fn remove(&self, zone: &Zone) -> Result<PathBuf, ZoneFileError> {
        let path = self.checked_path(zone)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(zone = %zone.name, path = %path.display(), "Deleted zone file");
                Ok(path)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ZoneFileError::MissingZoneFile { path })
            }
            Err(source) => Err(ZoneFileError::Remove { path, source }),
        }
    }
}

/// Characters that would break out of the quoted `addzone` definition or the file name.
fn is_unsafe_stem_char(c: char) -> bool {
    c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\' | '"' | '{' | '}' | ';')
}

/// Write `content` to `tmp_path`, sync it, then rename it over `path`.
async fn replace_file(tmp_path: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(tmp_path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(tmp_path, path).await
}

/// Sync a directory so a rename inside it survives a crash.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "zone_file_tests.rs"]
mod zone_file_tests;
