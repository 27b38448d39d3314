use chrono::Utc;

use procontent_delivery::domain::repository::JobCopyRepository;
use procontent_delivery::domain::types::{DeliveryMode, JobStatus};
use procontent_delivery::error::DeliveryServiceError;
use procontent_delivery::usecase::ingest::{IngestJobCopyInput, IngestJobCopyUseCase};
use procontent_delivery::usecase::softdelete::SoftDeleteJobCopyUseCase;

use crate::helpers::{MockJobCopyRepo, MockMirror};

fn input(job_id: &str) -> IngestJobCopyInput {
    IngestJobCopyInput {
        job_id: job_id.to_owned(),
        client_name: "Acme Widgets".to_owned(),
        payload: serde_json::json!({"content": {"title": "hello"}}),
    }
}

#[tokio::test]
async fn put_then_get_round_trips_the_payload() {
    let repo = MockJobCopyRepo::default();
    let uc = IngestJobCopyUseCase {
        repo: repo.clone(),
        mirror: MockMirror::default(),
        default_mode: DeliveryMode::Manual,
    };

    uc.execute(input("job-1")).await.unwrap();

    let job = repo.find("job-1").await.unwrap().unwrap();
    assert_eq!(job.payload, serde_json::json!({"content": {"title": "hello"}}));
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(
        job.on_disk_path.as_deref(),
        Some("/var/data/procontentapi/payloads/job-1.json")
    );
}

#[tokio::test]
async fn mirror_failure_never_fails_the_canonical_write() {
    let repo = MockJobCopyRepo::default();
    let uc = IngestJobCopyUseCase {
        repo: repo.clone(),
        mirror: MockMirror::failing(),
        default_mode: DeliveryMode::Manual,
    };

    let copy = uc.execute(input("job-1")).await.unwrap();

    assert_eq!(copy.on_disk_path, None);
    let job = repo.find("job-1").await.unwrap().unwrap();
    assert_eq!(job.payload, serde_json::json!({"content": {"title": "hello"}}));
}

#[tokio::test]
async fn reingesting_a_job_resets_its_lifecycle() {
    let repo = MockJobCopyRepo::default();
    let uc = IngestJobCopyUseCase {
        repo: repo.clone(),
        mirror: MockMirror::default(),
        default_mode: DeliveryMode::Manual,
    };

    uc.execute(input("job-1")).await.unwrap();
    {
        let mut live = repo.live.lock().unwrap();
        live[0].status = JobStatus::Delivered;
        live[0].archived = true;
        live[0].preview_url = Some("https://acme.sites.example.net".to_owned());
        live[0].delivered_at = Some(Utc::now());
        live[0].last_error = Some("stale".to_owned());
    }
    uc.execute(input("job-1")).await.unwrap();

    assert_eq!(repo.live.lock().unwrap().len(), 1);
    let job = repo.job("job-1").unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert!(!job.archived);
    assert_eq!(job.preview_url, None);
    assert_eq!(job.delivered_at, None);
    assert_eq!(job.last_error, None);
    assert_eq!(job.site_check.next_check_at, None);
}

#[tokio::test]
async fn soft_delete_is_idempotent() {
    let repo = MockJobCopyRepo::default();
    let ingest = IngestJobCopyUseCase {
        repo: repo.clone(),
        mirror: MockMirror::default(),
        default_mode: DeliveryMode::Manual,
    };
    ingest.execute(input("job-1")).await.unwrap();

    let uc = SoftDeleteJobCopyUseCase { repo: repo.clone() };
    uc.execute("job-1").await.unwrap();
    uc.execute("job-1").await.unwrap();

    assert!(repo.find("job-1").await.unwrap().is_none());
    let deleted = repo.deleted.lock().unwrap();
    assert_eq!(deleted.len(), 1);
    assert!(deleted[0].destroy_after > Utc::now());
}

#[tokio::test]
async fn soft_deleting_an_unknown_job_is_not_found() {
    let uc = SoftDeleteJobCopyUseCase {
        repo: MockJobCopyRepo::default(),
    };
    let err = uc.execute("ghost").await.unwrap_err();
    assert!(matches!(err, DeliveryServiceError::NotFound));
}
