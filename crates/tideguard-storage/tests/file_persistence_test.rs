//! File-backed storage: restart survival, WAL mode, read pool visibility.

use chrono::Utc;
use tideguard_core::config::StorageConfig;
use tideguard_core::models::*;
use tideguard_core::traits::IHazardStorage;
use tideguard_storage::pool::pragmas::verify_wal_mode;
use tideguard_storage::StorageEngine;

fn config_for(dir: &tempfile::TempDir) -> StorageConfig {
    StorageConfig {
        db_path: dir.path().join("tideguard.db").display().to_string(),
        ..StorageConfig::default()
    }
}

fn report(id: &str) -> RawReport {
    let now = Utc::now();
    RawReport {
        id: ReportId::from(id),
        source_type: SourceType::Official,
        submitted_at: now,
        received_at: now,
        position: GeoPoint::new(-8.65, 115.21),
        hazard_type_guess: "landslide".to_string(),
        base_confidence: 0.8,
        credibility_score: 1.0,
        self_submitted_by_viewer: false,
        unclassified: false,
    }
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir);
    {
        let storage = StorageEngine::open(&config).unwrap();
        storage.insert_report(&report("persisted")).unwrap();
        storage
            .append_event(&HazardEvent::new(
                HazardEventKind::NewReport,
                "persisted",
                1,
                serde_json::Value::Null,
            ))
            .unwrap();
    }

    let reopened = StorageEngine::open(&config).unwrap();
    let loaded = reopened.get_report(&ReportId::from("persisted")).unwrap();
    assert!(loaded.is_some());
    assert_eq!(reopened.events_since(0, 10).unwrap().len(), 1);
}

#[test]
fn reopen_does_not_rerun_migrations() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir);
    drop(StorageEngine::open(&config).unwrap());
    let reopened = StorageEngine::open(&config).unwrap();
    assert_eq!(
        reopened.schema_version().unwrap(),
        tideguard_storage::migrations::LATEST_VERSION
    );
}

#[test]
fn file_backed_writer_runs_in_wal_mode() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageEngine::open(&config_for(&dir)).unwrap();
    let wal = storage
        .pool()
        .writer
        .with_conn_sync(verify_wal_mode)
        .unwrap();
    assert!(wal);
    assert_eq!(storage.pool().readers.as_ref().map(|r| r.size()), Some(4));
}

#[test]
fn read_pool_sees_committed_writes() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageEngine::open(&config_for(&dir)).unwrap();
    for i in 0..6 {
        storage.insert_report(&report(&format!("r{i}"))).unwrap();
    }
    // Round-robin touches every reader at least once.
    for i in 0..6 {
        let id = ReportId::from(format!("r{i}"));
        assert!(storage.get_report(&id).unwrap().is_some());
    }
    assert_eq!(storage.unattached_reports().unwrap().len(), 6);
}
