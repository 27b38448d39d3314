use chrono::{Duration, Utc};
use uuid::Uuid;

use procontent_delivery::domain::types::{DeletedJobCopy, RETENTION_HOURS};
use procontent_delivery::usecase::retention::PurgeExpiredUseCase;

use crate::helpers::{MockJobCopyRepo, MockMirror};

fn quarantined(job_id: &str, deleted_hours_ago: i64) -> DeletedJobCopy {
    let deleted_at = Utc::now() - Duration::hours(deleted_hours_ago);
    DeletedJobCopy {
        id: Uuid::new_v4(),
        job_id: job_id.to_owned(),
        client_name: "Acme Widgets".to_owned(),
        payload: serde_json::json!({"content": {}}),
        status: "delivered".to_owned(),
        delivery_mode: "direct".to_owned(),
        delivery_url: None,
        on_disk_path: Some(format!("/var/data/procontentapi/payloads/{job_id}.json")),
        archived: false,
        created_at: deleted_at - Duration::hours(1),
        deleted_at,
        destroy_after: deleted_at + Duration::hours(RETENTION_HOURS),
    }
}

#[tokio::test]
async fn purge_respects_the_retention_window() {
    let repo = MockJobCopyRepo::default();
    repo.deleted.lock().unwrap().extend([
        quarantined("fresh", 1),
        quarantined("almost", 47),
        quarantined("exact", 48),
        quarantined("stale", 72),
    ]);
    let uc = PurgeExpiredUseCase {
        repo: repo.clone(),
        mirror: MockMirror::default(),
    };

    let purged = uc.execute(Utc::now()).await.unwrap();

    assert_eq!(purged, 2);
    let remaining: Vec<_> = repo
        .deleted
        .lock()
        .unwrap()
        .iter()
        .map(|j| j.job_id.clone())
        .collect();
    assert_eq!(remaining, vec!["fresh".to_owned(), "almost".to_owned()]);
}

#[tokio::test]
async fn purge_removes_the_mirror_artifacts_of_destroyed_copies() {
    let repo = MockJobCopyRepo::default();
    repo.deleted
        .lock()
        .unwrap()
        .extend([quarantined("stale", 72), quarantined("fresh", 1)]);
    let mirror = MockMirror::default();
    mirror.files.lock().unwrap().extend([
        ("stale".to_owned(), serde_json::json!({})),
        ("fresh".to_owned(), serde_json::json!({})),
    ]);
    let uc = PurgeExpiredUseCase {
        repo,
        mirror: mirror.clone(),
    };

    uc.execute(Utc::now()).await.unwrap();

    let files = mirror.files.lock().unwrap();
    assert!(!files.contains_key("stale"));
    assert!(files.contains_key("fresh"));
}

#[tokio::test]
async fn repeated_purges_are_no_ops() {
    let repo = MockJobCopyRepo::default();
    repo.deleted.lock().unwrap().push(quarantined("stale", 72));
    let uc = PurgeExpiredUseCase {
        repo,
        mirror: MockMirror::default(),
    };

    assert_eq!(uc.execute(Utc::now()).await.unwrap(), 1);
    assert_eq!(uc.execute(Utc::now()).await.unwrap(), 0);
}
