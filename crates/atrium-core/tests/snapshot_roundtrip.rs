//! Snapshot persistence: save, reload, and keep operating with the same
//! runtime settings.

use chrono::{Duration, TimeZone, Utc};

use atrium_core::config::StoreConfig;
use atrium_core::model::issue::{IssueStatus, NewIssue};
use atrium_core::model::lead::{LeadStatus, NewLead};
use atrium_core::store::StoreMode;
use atrium_core::{ClockHandle, ManualClock, RecordId, StoreError, Suite, SuiteConfig};

fn test_suite(mode: StoreMode) -> Suite {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let config = SuiteConfig {
        store: StoreConfig { mode },
        ..SuiteConfig::default()
    };
    Suite::with_clock(
        config,
        ClockHandle::new(ManualClock::starting_at(start, Duration::minutes(1))),
    )
}

#[test]
fn roundtrip_preserves_records_histories_and_trails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("snapshot.json");

    let mut suite = test_suite(StoreMode::Strict);
    let lead_id = suite
        .leads
        .add(NewLead::new("Acme", "a@acme.test"), "agent1")
        .unwrap()
        .id
        .clone();
    suite
        .leads
        .update_status(&lead_id, LeadStatus::Qualified, "agent1", None)
        .unwrap();
    let issue_id = suite
        .issues
        .add(NewIssue::new(RecordId::new_unchecked("proj-1"), "Ship"), "dev1")
        .unwrap()
        .id
        .clone();
    suite
        .issues
        .update_status(&issue_id, IssueStatus::Done, "dev1")
        .unwrap();
    suite.issues.delete(&issue_id, "dev1").unwrap();

    suite.save_to(&path).unwrap();

    let mut restored = test_suite(StoreMode::Strict);
    restored.load_from(&path).unwrap();

    let lead = restored.leads.get(&lead_id).unwrap();
    assert_eq!(lead, suite.leads.get(&lead_id).unwrap());
    assert_eq!(lead.stage_history().len(), 2);

    let issue = restored.issues.get(&issue_id).unwrap();
    assert!(issue.deleted);
    assert_eq!(issue.history().len(), 2);
    assert_eq!(issue.activities.len(), 3);
}

#[test]
fn hydrated_stores_keep_ticking_forward() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("snapshot.json");

    let mut suite = test_suite(StoreMode::Strict);
    let id = suite
        .leads
        .add(NewLead::new("Acme", "a@acme.test"), "agent1")
        .unwrap()
        .id
        .clone();
    suite.save_to(&path).unwrap();

    // The restored clock restarts at the same instant; the monotonic tick
    // must still push updated_at past the persisted stamp.
    let mut restored = test_suite(StoreMode::Strict);
    restored.load_from(&path).unwrap();
    let before = restored.leads.get(&id).unwrap().updated_at;
    restored
        .leads
        .update_status(&id, LeadStatus::Qualified, "agent1", None)
        .unwrap();
    assert!(restored.leads.get(&id).unwrap().updated_at > before);
}

#[test]
fn configured_mode_applies_after_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("snapshot.json");

    let suite = test_suite(StoreMode::Strict);
    suite.save_to(&path).unwrap();

    let ghost = RecordId::new_unchecked("ghost");

    let mut strict = test_suite(StoreMode::Strict);
    strict.load_from(&path).unwrap();
    assert!(matches!(
        strict.leads.delete(&ghost, "agent1"),
        Err(StoreError::NotFound { .. })
    ));

    let mut lenient = test_suite(StoreMode::Lenient);
    lenient.load_from(&path).unwrap();
    assert!(!lenient.leads.delete(&ghost, "agent1").unwrap().changed());
}

#[test]
fn malformed_snapshot_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut suite = test_suite(StoreMode::Strict);
    let err = suite.load_from(&path).unwrap_err();
    assert!(err.to_string().contains("snapshot.json"));
}
