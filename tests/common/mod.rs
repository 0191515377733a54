// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bind9_sync::backend::Bind9Backend;
use bind9_sync::bind9::{ControlInvoker, RndcCommand};
use bind9_sync::config::Settings;
use bind9_sync::directory::FileDirectory;
use bind9_sync::errors::ControlError;
use bind9_sync::reconcilers::DomainSynchronizer;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Registry file the fake server maintains
pub const NZF_FILE: &str = "_default.nzf";

/// In-memory stand-in for a BIND9 server behind rndc.
///
/// Tracks which zones are loaded and rewrites its `.nzf` registry on every
/// `addzone`/`delzone`, the way `named` does.
pub struct FakeServer {
    registry: PathBuf,
    zones: Mutex<BTreeMap<String, PathBuf>>,
    log: Mutex<Vec<String>>,
}

impl FakeServer {
    pub fn new(registry: PathBuf) -> Self {
        Self {
            registry,
            zones: Mutex::new(BTreeMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Pretend the server already has `zone` loaded from `file`.
    pub fn preload(&self, zone: &str, file: PathBuf) {
        self.zones.lock().unwrap().insert(zone.to_string(), file);
        self.write_registry();
    }

    pub fn loaded_zones(&self) -> Vec<String> {
        self.zones.lock().unwrap().keys().cloned().collect()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn write_registry(&self) {
        let zones = self.zones.lock().unwrap();
        let content: String = zones
            .iter()
            .map(|(zone, file)| format!("zone \"{zone}\" {{ type master; file \"{}\"; }};\n", file.display()))
            .collect();
        std::fs::write(&self.registry, content).unwrap();
    }

    fn failed(command: &RndcCommand, stderr: String) -> ControlError {
        ControlError::Failed {
            command: command.operation().to_string(),
            zone: command.zone().to_string(),
            status: Some(1),
            stderr,
        }
    }
}

#[async_trait]
impl ControlInvoker for FakeServer {
    async fn invoke(&self, command: &RndcCommand) -> Result<(), ControlError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{} {}", command.operation(), command.zone()));

        let result = {
            let mut zones = self.zones.lock().unwrap();
            match command {
                RndcCommand::AddZone { zone, file } => {
                    if zones.contains_key(zone) {
                        Err(format!("rndc: 'addzone' failed: already exists\nzone '{zone}' already exists"))
                    } else if !file.exists() {
                        Err(format!("rndc: 'addzone' failed: file not found\n{}", file.display()))
                    } else {
                        zones.insert(zone.clone(), file.clone());
                        Ok(true)
                    }
                }
                RndcCommand::Reload { zone } => {
                    if zones.contains_key(zone) {
                        Ok(false)
                    } else {
                        Err(format!("rndc: 'reload' failed: not found\nno matching zone '{zone}' in any view"))
                    }
                }
                RndcCommand::DelZone { zone } => {
                    if zones.remove(zone).is_some() {
                        Ok(true)
                    } else {
                        Err(format!("rndc: 'delzone' failed: not found\nno matching zone '{zone}' in any view"))
                    }
                }
            }
        };

        match result {
            Ok(true) => {
                self.write_registry();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(stderr) => Err(Self::failed(command, stderr)),
        }
    }
}

/// A backend wired to a temp state directory, a YAML directory document and a
/// [`FakeServer`].
pub struct Harness {
    pub dir: TempDir,
    pub settings: Settings,
    pub directory: Arc<FileDirectory>,
    pub server: Arc<FakeServer>,
    pub backend: Bind9Backend,
}

impl Harness {
    pub fn new(document: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();

        let directory_path = dir.path().join("zones.yaml");
        std::fs::write(&directory_path, document).unwrap();
        let directory = Arc::new(FileDirectory::load(&directory_path).unwrap());

        let settings = Settings {
            nzf_path: cache.clone(),
            state_path: dir.path().join("state"),
            ..Settings::default()
        }
        .resolve()
        .unwrap();

        let server = Arc::new(FakeServer::new(cache.join(NZF_FILE)));
        let synchronizer =
            DomainSynchronizer::from_settings(&settings, directory.clone(), server.clone());
        let backend = Bind9Backend::new(Arc::new(synchronizer));

        Self {
            dir,
            settings,
            directory,
            server,
            backend,
        }
    }

    pub fn registry_file(&self) -> PathBuf {
        self.settings.nzf_path.join(NZF_FILE)
    }

    pub fn mirror_file(&self) -> PathBuf {
        self.settings.registry_mirror_path()
    }

    pub fn zone_file(&self, file_name: &str) -> PathBuf {
        self.settings.zone_output_dir().join(file_name)
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Two zones with a handful of records
pub const DOCUMENT: &str = r"
zones:
  - id: 1f2e
    name: example.com.
    ttl: 3600
    record-sets:
      - id: rs-www
        name: www.example.com.
        type: A
        ttl: 300
        records:
          - id: r-1
            data: 192.0.2.10
      - id: rs-mx
        name: example.com.
        type: MX
        ttl: 3600
        records:
          - id: r-2
            priority: 10
            data: mail.example.com.
  - id: 9a8b
    name: example.org.
    record-sets:
      - id: rs-a
        name: a.example.org.
        type: A
        ttl: 300
        records:
          - id: r-3
            data: 1.2.3.4
";
