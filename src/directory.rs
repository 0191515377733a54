// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Directory service types and the file-backed directory.
//!
//! The directory service is the control plane that owns zones, record sets, and
//! records. The driver only reads from it: [`DirectoryService`] is the lookup
//! interface, and [`FileDirectory`] is an in-process implementation backed by a
//! YAML or JSON document.
//!
//! # Document format
//!
//! ```yaml
//! zones:
//!   - id: 6b9c3a52
//!     name: example.com.
//!     ttl: 3600
//!     record-sets:
//!       - id: rs-www
//!         name: www.example.com.
//!         type: A
//!         ttl: 300
//!         records:
//!           - id: r-1
//!             data: 192.0.2.10
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use crate::errors::DirectoryError;

/// A DNS zone managed by the driver.
///
/// `name` and `id` together form the zone file stem (`name_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Zone {
    /// Zone identifier assigned by the directory service
    pub id: String,
    /// Fully qualified zone name (e.g., "example.com.")
    pub name: String,
    /// Default TTL for the zone (`$TTL`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl Zone {
    /// Create a zone with no explicit TTL.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ttl: None,
        }
    }

    /// The `name_id` stem used for this zone's file.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.name, self.id)
    }
}

/// A named, typed group of records sharing a TTL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecordSet {
    /// Record set identifier
    pub id: String,
    /// Owning zone identifier
    pub zone_id: String,
    /// Owner name of the record set
    pub name: String,
    /// Record type (e.g., "A", "MX")
    #[serde(rename = "type")]
    pub record_type: String,
    /// Time to live in seconds; `None` falls back to the zone's `$TTL`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// A single record inside a record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Record {
    /// Record identifier
    pub id: String,
    /// Owning record set identifier
    pub record_set_id: String,
    /// Priority for types that carry one (MX, SRV)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Record data, passed through to the zone file unchanged
    pub data: String,
}

/// Lookup criteria for record sets and records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Zone the results must belong to
    pub zone_id: String,
    /// Restrict results to one record set
    pub record_set_id: Option<String>,
}

impl Criteria {
    /// Criteria matching everything in a zone.
    pub fn zone(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            record_set_id: None,
        }
    }

    /// Criteria matching a single record set in a zone.
    pub fn record_set(zone_id: impl Into<String>, record_set_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            record_set_id: Some(record_set_id.into()),
        }
    }
}

/// Read interface to the control plane.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// All zones known to the control plane.
    async fn find_zones(&self) -> Result<Vec<Zone>, DirectoryError>;

    /// Record sets matching `criteria`.
    async fn find_record_sets(&self, criteria: &Criteria) -> Result<Vec<RecordSet>, DirectoryError>;

    /// Records matching `criteria`.
    async fn find_records(&self, criteria: &Criteria) -> Result<Vec<Record>, DirectoryError>;
}

// ============================================================================
// File-backed directory
// ============================================================================

/// Serialized form of a directory: zones with nested record sets and records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DirectoryDocument {
    /// Zones in document order
    #[serde(default)]
    pub zones: Vec<ZoneEntry>,
}

/// A zone and its record sets as they appear in a [`DirectoryDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZoneEntry {
    /// Zone identifier
    pub id: String,
    /// Zone name
    pub name: String,
    /// Default TTL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Record sets in document order
    #[serde(default)]
    pub record_sets: Vec<RecordSetEntry>,
}

/// A record set as it appears in a [`DirectoryDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecordSetEntry {
    /// Record set identifier
    pub id: String,
    /// Owner name
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Time to live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Records in document order
    #[serde(default)]
    pub records: Vec<RecordEntry>,
}

/// A record as it appears in a [`DirectoryDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecordEntry {
    /// Record identifier
    pub id: String,
    /// Optional priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Record data
    pub data: String,
}

impl ZoneEntry {
    fn to_zone(&self) -> Zone {
        Zone {
            id: self.id.clone(),
            name: self.name.clone(),
            ttl: self.ttl,
        }
    }
}

/// In-process directory service backed by a [`DirectoryDocument`].
///
/// The document can be replaced or edited at runtime, which lets callers model
/// control-plane changes before invoking the backend.
#[derive(Debug, Default)]
pub struct FileDirectory {
    document: RwLock<DirectoryDocument>,
}

impl FileDirectory {
    /// Create a directory from an in-memory document.
    #[must_use]
    pub fn new(document: DirectoryDocument) -> Self {
        Self {
            document: RwLock::new(document),
        }
    }

    /// Load a directory document from a YAML or JSON file.
    ///
    /// Files ending in `.json` are parsed as JSON; everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path).map_err(|source| DirectoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let document = if is_json {
            serde_json::from_str(&content).map_err(|e| DirectoryError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| DirectoryError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        };

        Ok(Self::new(document))
    }

    /// Apply an edit to the underlying document.
    pub fn modify<F>(&self, edit: F)
    where
        F: FnOnce(&mut DirectoryDocument),
    {
        let mut document = self
            .document
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        edit(&mut document);
    }

    /// Look up a zone by name, ignoring a trailing root dot.
    #[must_use]
    pub fn zone_by_name(&self, name: &str) -> Option<Zone> {
        let document = self.document.read().unwrap_or_else(PoisonError::into_inner);
        document
            .zones
            .iter()
            .find(|z| z.name.trim_end_matches('.') == name.trim_end_matches('.'))
            .map(ZoneEntry::to_zone)
    }

    fn with_zone<T>(
        &self,
        zone_id: &str,
        f: impl FnOnce(&ZoneEntry) -> T,
    ) -> Result<T, DirectoryError> {
        let document = self.document.read().unwrap_or_else(PoisonError::into_inner);
        document
            .zones
            .iter()
            .find(|z| z.id == zone_id)
            .map(f)
            .ok_or_else(|| DirectoryError::ZoneNotFound {
                zone_id: zone_id.to_string(),
            })
    }
}

#[async_trait]
impl DirectoryService for FileDirectory {
    async fn find_zones(&self) -> Result<Vec<Zone>, DirectoryError> {
        let document = self.document.read().unwrap_or_else(PoisonError::into_inner);
        Ok(document.zones.iter().map(ZoneEntry::to_zone).collect())
    }

    async fn find_record_sets(&self, criteria: &Criteria) -> Result<Vec<RecordSet>, DirectoryError> {
        self.with_zone(&criteria.zone_id, |zone| {
            zone.record_sets
                .iter()
                .filter(|rs| {
                    criteria
                        .record_set_id
                        .as_deref()
                        .is_none_or(|id| rs.id == id)
                })
                .map(|rs| RecordSet {
                    id: rs.id.clone(),
                    zone_id: zone.id.clone(),
                    name: rs.name.clone(),
                    record_type: rs.record_type.clone(),
                    ttl: rs.ttl,
                })
                .collect()
        })
    }

    async fn find_records(&self, criteria: &Criteria) -> Result<Vec<Record>, DirectoryError> {
        self.with_zone(&criteria.zone_id, |zone| {
            zone.record_sets
                .iter()
                .filter(|rs| {
                    criteria
                        .record_set_id
                        .as_deref()
                        .is_none_or(|id| rs.id == id)
                })
                .flat_map(|rs| {
                    rs.records.iter().map(move |r| Record {
                        id: r.id.clone(),
                        record_set_id: rs.id.clone(),
                        priority: r.priority,
                        data: r.data.clone(),
                    })
                })
                .collect()
        })
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod directory_tests;
