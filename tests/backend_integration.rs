// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end tests for the BIND9 backend
//!
//! These tests drive the public backend API against a YAML directory document and
//! an in-memory server standing in for rndc, and check the files left on disk.
//!
//! Run with: cargo test --test backend_integration

mod common;

use bind9_sync::directory::{Record, RecordEntry, RecordSet};
use bind9_sync::errors::{SyncError, ZoneFileError};
use common::{read, Harness, DOCUMENT};
use std::time::Instant;

const COM_FILE: &str = "example.com._1f2e.zone";
const ORG_FILE: &str = "example.org._9a8b.zone";

#[tokio::test]
async fn test_start_recreates_every_zone_on_empty_server() {
    let harness = Harness::new(DOCUMENT);

    let report = harness.backend.start().await.unwrap();

    assert!(report.reloaded.is_empty());
    assert_eq!(report.recreated, vec!["example.com.", "example.org."]);
    assert_eq!(
        harness.server.loaded_zones(),
        vec!["example.com.", "example.org."]
    );
    assert_eq!(
        read(&harness.zone_file(COM_FILE)),
        "$ORIGIN example.com.\n\
         $TTL 3600\n\
         \n\
         www.example.com. 300 IN A 192.0.2.10\n\
         example.com. 3600 IN MX 10 mail.example.com.\n"
    );
    assert_eq!(read(&harness.mirror_file()), read(&harness.registry_file()));
}

#[tokio::test]
async fn test_start_only_recreates_missing_zones() {
    let harness = Harness::new(DOCUMENT);
    harness
        .server
        .preload("example.com.", harness.zone_file(COM_FILE));

    let report = harness.backend.start().await.unwrap();

    assert_eq!(report.reloaded, vec!["example.com."]);
    assert_eq!(report.recreated, vec!["example.org."]);
    assert_eq!(
        harness.server.log(),
        vec![
            "reload example.com.",
            "reload example.org.",
            "addzone example.org."
        ]
    );
    assert!(!harness.zone_file(COM_FILE).exists());
    assert!(harness.zone_file(ORG_FILE).exists());
}

#[tokio::test]
async fn test_zone_lifecycle() {
    let harness = Harness::new(DOCUMENT);
    let zone = harness.directory.zone_by_name("example.org.").unwrap();
    let backend = &harness.backend;

    backend.create_domain(&zone).await.unwrap();
    assert_eq!(harness.server.loaded_zones(), vec!["example.org."]);
    assert!(read(&harness.mirror_file()).contains("example.org."));

    // Add a record to the existing record set
    harness.directory.modify(|doc| {
        doc.zones[1].record_sets[0].records.push(RecordEntry {
            id: "r-4".to_string(),
            priority: None,
            data: "1.2.3.5".to_string(),
        });
    });
    let record_set = RecordSet {
        id: "rs-a".to_string(),
        zone_id: zone.id.clone(),
        name: "a.example.org.".to_string(),
        record_type: "A".to_string(),
        ttl: Some(300),
    };
    let record = Record {
        id: "r-4".to_string(),
        record_set_id: "rs-a".to_string(),
        priority: None,
        data: "1.2.3.5".to_string(),
    };
    backend
        .create_record(&zone, &record_set, &record)
        .await
        .unwrap();

    let content = read(&harness.zone_file(ORG_FILE));
    assert!(content.contains("a.example.org. 300 IN A 1.2.3.4\n"));
    assert!(content.contains("a.example.org. 300 IN A 1.2.3.5\n"));

    backend.delete_domain(&zone).await.unwrap();
    assert!(harness.server.loaded_zones().is_empty());
    assert!(!harness.zone_file(ORG_FILE).exists());
    assert_eq!(read(&harness.mirror_file()), "");
    assert_eq!(
        harness.server.log(),
        vec!["addzone example.org.", "reload example.org.", "delzone example.org."]
    );
}

#[tokio::test]
async fn test_update_of_unknown_zone_surfaces_not_found() {
    let harness = Harness::new(DOCUMENT);
    let zone = harness.directory.zone_by_name("example.com.").unwrap();

    let err = harness.backend.update_domain(&zone).await.unwrap_err();

    match err {
        SyncError::Control(e) => assert!(e.is_zone_not_found()),
        other => panic!("unexpected error: {other:?}"),
    }
    // The file was still written before the reload
    assert!(harness.zone_file(COM_FILE).exists());
}

#[tokio::test]
async fn test_delete_without_zone_file_does_not_touch_server() {
    let harness = Harness::new(DOCUMENT);
    let zone = harness.directory.zone_by_name("example.com.").unwrap();
    harness
        .server
        .preload("example.com.", harness.zone_file(COM_FILE));

    let err = harness.backend.delete_domain(&zone).await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::ZoneFile(ZoneFileError::MissingZoneFile { .. })
    ));
    assert!(harness.server.log().is_empty());
    assert_eq!(harness.server.loaded_zones(), vec!["example.com."]);
}

#[tokio::test]
async fn test_updates_of_different_zones_run_concurrently() {
    let harness = Harness::new(DOCUMENT);
    harness.backend.start().await.unwrap();
    let com = harness.directory.zone_by_name("example.com.").unwrap();
    let org = harness.directory.zone_by_name("example.org.").unwrap();
    let delay = harness.backend.synchronizer().reload_delay();

    let start = Instant::now();
    let results = futures::future::join_all([
        harness.backend.update_domain(&com),
        harness.backend.update_domain(&org),
    ])
    .await;

    assert!(results.iter().all(Result::is_ok));
    let elapsed = start.elapsed();
    assert!(elapsed >= delay);
    assert!(
        elapsed < delay * 2,
        "updates of different zones serialized: {elapsed:?}"
    );
}

#[tokio::test]
async fn test_updates_of_same_zone_are_serialized() {
    let harness = Harness::new(DOCUMENT);
    harness.backend.start().await.unwrap();
    let zone = harness.directory.zone_by_name("example.com.").unwrap();
    let delay = harness.backend.synchronizer().reload_delay();

    let start = Instant::now();
    let results = futures::future::join_all([
        harness.backend.update_domain(&zone),
        harness.backend.update_domain(&zone),
    ])
    .await;

    assert!(results.iter().all(Result::is_ok));
    assert!(start.elapsed() >= delay * 2);
}
