// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for synchronizer, startup and backend tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use crate::bind9::{
    Bind9ZoneRenderer, ControlInvoker, RecordRow, RegistryMirror, RndcCommand, ZoneFileWriter,
    ZoneRenderer,
};
use crate::directory::{
    DirectoryDocument, FileDirectory, RecordEntry, RecordSetEntry, Zone, ZoneEntry,
};
use crate::errors::ControlError;

use super::DomainSynchronizer;

/// Name of the fake BIND9 registry file
pub(crate) const NZF_FILE: &str = "3bf305731dd26307.nzf";

/// Shared, ordered log of interesting events
pub(crate) type EventLog = Arc<Mutex<Vec<String>>>;

/// Control invoker that records commands instead of running rndc.
///
/// Successful `addzone`/`delzone` calls append a line to the registry file, like
/// BIND9 rewriting its `.nzf` file.
pub(crate) struct FakeControl {
    commands: Mutex<Vec<RndcCommand>>,
    failures: Mutex<HashMap<(String, String), String>>,
    registry_file: Option<PathBuf>,
    delay: Duration,
    events: EventLog,
}

impl FakeControl {
    pub(crate) fn new(registry_file: Option<PathBuf>, events: EventLog) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            registry_file,
            delay: Duration::ZERO,
            events,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make `operation` on `zone` exit non-zero with `stderr`.
    pub(crate) fn fail_on(&self, operation: &str, zone: &str, stderr: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert((operation.to_string(), zone.to_string()), stderr.to_string());
    }

    pub(crate) fn commands(&self) -> Vec<RndcCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Commands as `"<operation> <zone>"` strings.
    pub(crate) fn operations(&self) -> Vec<String> {
        self.commands()
            .iter()
            .map(|c| format!("{} {}", c.operation(), c.zone()))
            .collect()
    }
}

#[async_trait]
impl ControlInvoker for FakeControl {
    async fn invoke(&self, command: &RndcCommand) -> Result<(), ControlError> {
        self.commands.lock().unwrap().push(command.clone());
        self.events
            .lock()
            .unwrap()
            .push(format!("invoke-start {}", command.zone()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.events
            .lock()
            .unwrap()
            .push(format!("invoke-end {}", command.zone()));

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get(&(command.operation().to_string(), command.zone().to_string()))
            .cloned();
        if let Some(stderr) = failure {
            return Err(ControlError::Failed {
                command: command.operation().to_string(),
                zone: command.zone().to_string(),
                status: Some(1),
                stderr,
            });
        }

        if let (Some(registry), RndcCommand::AddZone { .. } | RndcCommand::DelZone { .. }) =
            (&self.registry_file, command)
        {
            let mut content = std::fs::read_to_string(registry).unwrap_or_default();
            content.push_str(&format!("{command}\n"));
            std::fs::write(registry, content).unwrap();
        }

        Ok(())
    }
}

/// Renderer that logs every render before delegating to the default renderer.
pub(crate) struct LoggingRenderer {
    pub(crate) events: EventLog,
}

impl ZoneRenderer for LoggingRenderer {
    fn render(&self, zone: &Zone, rows: &[RecordRow]) -> Vec<u8> {
        self.events
            .lock()
            .unwrap()
            .push(format!("write {}", zone.name));
        Bind9ZoneRenderer.render(zone, rows)
    }
}

/// A synchronizer wired to a temp directory, a [`FileDirectory`] and a [`FakeControl`].
pub(crate) struct Fixture {
    pub(crate) dir: TempDir,
    pub(crate) directory: Arc<FileDirectory>,
    pub(crate) control: Arc<FakeControl>,
    pub(crate) synchronizer: Arc<DomainSynchronizer>,
    pub(crate) events: EventLog,
}

impl Fixture {
    pub(crate) fn new(document: DirectoryDocument) -> Self {
        Self::with_control_delay(document, Duration::ZERO)
    }

    pub(crate) fn with_control_delay(document: DirectoryDocument, delay: Duration) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        std::fs::create_dir_all(&cache_dir).unwrap();
        let registry_file = cache_dir.join(NZF_FILE);
        std::fs::write(&registry_file, "# New zone file\n").unwrap();

        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let directory = Arc::new(FileDirectory::new(document));
        let control =
            Arc::new(FakeControl::new(Some(registry_file), events.clone()).with_delay(delay));

        let output_dir = dir.path().join("state").join("bind9");
        let writer = ZoneFileWriter::with_renderer(
            &output_dir,
            Arc::new(LoggingRenderer {
                events: events.clone(),
            }),
        );
        let registry = RegistryMirror::new(&cache_dir, "*.nzf", output_dir.join("zones.config"));

        let synchronizer = Arc::new(DomainSynchronizer::new(
            directory.clone(),
            control.clone(),
            writer,
            registry,
        ));

        Self {
            dir,
            directory,
            control,
            synchronizer,
            events,
        }
    }

    pub(crate) fn registry_file(&self) -> PathBuf {
        self.dir.path().join("cache").join(NZF_FILE)
    }

    pub(crate) fn mirror_file(&self) -> PathBuf {
        self.output_dir().join("zones.config")
    }

    pub(crate) fn output_dir(&self) -> PathBuf {
        self.dir.path().join("state").join("bind9")
    }

    pub(crate) fn zone_file(&self, zone: &Zone) -> PathBuf {
        self.synchronizer.writer().zone_file_path(zone)
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn zone(&self, name: &str) -> Zone {
        self.directory.zone_by_name(name).unwrap()
    }
}

pub(crate) fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Two zones: `example.com.` with A and MX record sets, `example.org.` with one A record.
pub(crate) fn sample_document() -> DirectoryDocument {
    DirectoryDocument {
        zones: vec![
            ZoneEntry {
                id: "z-1".to_string(),
                name: "example.com.".to_string(),
                ttl: Some(3600),
                record_sets: vec![
                    RecordSetEntry {
                        id: "rs-www".to_string(),
                        name: "www.example.com.".to_string(),
                        record_type: "A".to_string(),
                        ttl: Some(300),
                        records: vec![
                            RecordEntry {
                                id: "r-1".to_string(),
                                priority: None,
                                data: "192.0.2.10".to_string(),
                            },
                            RecordEntry {
                                id: "r-2".to_string(),
                                priority: None,
                                data: "192.0.2.11".to_string(),
                            },
                        ],
                    },
                    RecordSetEntry {
                        id: "rs-mx".to_string(),
                        name: "example.com.".to_string(),
                        record_type: "MX".to_string(),
                        ttl: None,
                        records: vec![RecordEntry {
                            id: "r-3".to_string(),
                            priority: Some(10),
                            data: "mail.example.com.".to_string(),
                        }],
                    },
                ],
            },
            ZoneEntry {
                id: "z-2".to_string(),
                name: "example.org.".to_string(),
                ttl: None,
                record_sets: vec![RecordSetEntry {
                    id: "rs-a".to_string(),
                    name: "a.example.org.".to_string(),
                    record_type: "A".to_string(),
                    ttl: Some(300),
                    records: vec![RecordEntry {
                        id: "r-4".to_string(),
                        priority: None,
                        data: "1.2.3.4".to_string(),
                    }],
                }],
            },
        ],
    }
}
