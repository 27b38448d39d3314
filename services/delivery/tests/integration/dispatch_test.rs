use procontent_delivery::domain::resolver::DeliveryTargets;
use procontent_delivery::domain::types::{DeliveryMode, JobStatus, SiteCheckPhase};
use procontent_delivery::error::DeliveryServiceError;
use procontent_delivery::usecase::dispatch::{
    DispatchDeliveryInput, DispatchDeliveryUseCase, DispatchOutcome, DispatchPolicy,
};

use crate::helpers::{MockArchive, MockJobCopyRepo, MockMirror, MockTransport, test_job};

fn policy() -> DispatchPolicy {
    DispatchPolicy {
        targets: DeliveryTargets {
            base_url_template: Some("https://{slug}.example.com".to_owned()),
            namespace: Some("kaseya".to_owned()),
            path_template: "/wp-json/{namespace}/v1/content".to_owned(),
            zapier_webhook_url: None,
            preview_base_domain: Some("sites.example.net".to_owned()),
            preview_namespace: None,
        },
        archive_enabled: false,
        delivered_prefix: "delivered/".to_owned(),
        site_check_initial_interval_seconds: 300,
    }
}

fn usecase(
    repo: MockJobCopyRepo,
    mirror: MockMirror,
    transport: MockTransport,
    archive: MockArchive,
    policy: DispatchPolicy,
) -> DispatchDeliveryUseCase<MockJobCopyRepo, MockMirror, MockTransport, MockArchive> {
    DispatchDeliveryUseCase {
        repo,
        mirror,
        transport,
        archive,
        policy,
    }
}

fn input(job_id: &str) -> DispatchDeliveryInput {
    DispatchDeliveryInput {
        job_id: job_id.to_owned(),
        override_terminal: false,
    }
}

#[tokio::test]
async fn successful_dispatch_schedules_a_site_check() {
    let repo = MockJobCopyRepo::with_jobs(vec![test_job("job-1", JobStatus::Pending)]);
    let transport = MockTransport::default();
    let uc = usecase(
        repo.clone(),
        MockMirror::default(),
        transport.clone(),
        MockArchive::default(),
        policy(),
    );

    let outcome = uc.execute(input("job-1")).await.unwrap();

    let DispatchOutcome::Delivered {
        delivery_url,
        archived,
        site_check_scheduled,
    } = outcome
    else {
        panic!("expected delivered outcome");
    };
    assert_eq!(
        delivery_url,
        "https://acme.example.com/wp-json/kaseya/v1/content"
    );
    assert!(!archived);
    assert!(site_check_scheduled);
    assert_eq!(transport.send_count(), 1);

    let job = repo.job("job-1").unwrap();
    assert_eq!(job.status, JobStatus::SiteCheckPending);
    assert_eq!(job.site_check.attempts_made, 0);
    assert_eq!(job.site_check.phase, SiteCheckPhase::Initial);
    assert!(job.site_check.next_check_at.is_some());
    assert_eq!(
        job.preview_url.as_deref(),
        Some("https://acme-widgets.sites.example.net")
    );
    assert!(job.delivered_at.is_some());
}

#[tokio::test]
async fn redispatching_a_delivered_job_without_override_sends_nothing() {
    let repo = MockJobCopyRepo::with_jobs(vec![test_job("job-1", JobStatus::Delivered)]);
    let transport = MockTransport::default();
    let uc = usecase(
        repo,
        MockMirror::default(),
        transport.clone(),
        MockArchive::default(),
        policy(),
    );

    let err = uc.execute(input("job-1")).await.unwrap_err();

    assert!(matches!(err, DeliveryServiceError::AlreadyProcessed));
    assert_eq!(transport.send_count(), 0);
}

#[tokio::test]
async fn override_allows_redispatching_a_terminal_job() {
    let repo = MockJobCopyRepo::with_jobs(vec![test_job("job-1", JobStatus::DeliveryFailed)]);
    let transport = MockTransport::default();
    let uc = usecase(
        repo.clone(),
        MockMirror::default(),
        transport.clone(),
        MockArchive::default(),
        policy(),
    );

    let outcome = uc
        .execute(DispatchDeliveryInput {
            job_id: "job-1".to_owned(),
            override_terminal: true,
        })
        .await
        .unwrap();

    assert!(matches!(outcome, DispatchOutcome::Delivered { .. }));
    assert_eq!(transport.send_count(), 1);
    assert_eq!(repo.job("job-1").unwrap().status, JobStatus::SiteCheckPending);
}

#[tokio::test]
async fn failed_send_records_the_reason_and_stops() {
    let repo = MockJobCopyRepo::with_jobs(vec![test_job("job-1", JobStatus::Pending)]);
    let transport = MockTransport::failing("503: upstream maintenance");
    let uc = usecase(
        repo.clone(),
        MockMirror::default(),
        transport.clone(),
        MockArchive::default(),
        policy(),
    );

    let outcome = uc.execute(input("job-1")).await.unwrap();

    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
    assert_eq!(transport.send_count(), 1);

    let job = repo.job("job-1").unwrap();
    assert_eq!(job.status, JobStatus::DeliveryFailed);
    assert_eq!(job.last_error.as_deref(), Some("503: upstream maintenance"));
    assert!(job.delivered_at.is_none());
}

#[tokio::test]
async fn manual_mode_without_a_supplied_url_is_a_configuration_error() {
    let mut job = test_job("job-1", JobStatus::Pending);
    job.delivery_mode = DeliveryMode::Manual;
    let repo = MockJobCopyRepo::with_jobs(vec![job]);
    let transport = MockTransport::default();
    let uc = usecase(
        repo,
        MockMirror::default(),
        transport.clone(),
        MockArchive::default(),
        policy(),
    );

    let err = uc.execute(input("job-1")).await.unwrap_err();

    assert!(matches!(err, DeliveryServiceError::Configuration(_)));
    assert_eq!(transport.send_count(), 0);
}

#[tokio::test]
async fn supplied_delivery_url_wins_over_the_resolver() {
    let mut job = test_job("job-1", JobStatus::Pending);
    job.delivery_mode = DeliveryMode::Manual;
    job.delivery_url = Some("https://operator.example.org/hook".to_owned());
    let repo = MockJobCopyRepo::with_jobs(vec![job]);
    let transport = MockTransport::default();
    let uc = usecase(
        repo,
        MockMirror::default(),
        transport.clone(),
        MockArchive::default(),
        policy(),
    );

    uc.execute(input("job-1")).await.unwrap();

    let sends = transport.sends.lock().unwrap();
    assert_eq!(sends[0].0, "https://operator.example.org/hook");
}

#[tokio::test]
async fn zapier_mode_wraps_the_payload_and_uses_the_prefilled_webhook() {
    let mut job = test_job("job-1", JobStatus::Pending);
    job.delivery_mode = DeliveryMode::Zapier;
    let repo = MockJobCopyRepo::with_jobs(vec![job]);
    let transport = MockTransport::default();
    let mut policy = policy();
    policy.targets.zapier_webhook_url =
        Some("https://hooks.zapier.com/hooks/catch/1/a/".to_owned());
    let uc = usecase(
        repo,
        MockMirror::default(),
        transport.clone(),
        MockArchive::default(),
        policy,
    );

    uc.execute(input("job-1")).await.unwrap();

    let sends = transport.sends.lock().unwrap();
    let (url, body) = &sends[0];
    assert_eq!(url, "https://hooks.zapier.com/hooks/catch/1/a/");
    assert_eq!(body["metadata"]["businessName"], "Acme Widgets");
    assert_eq!(body["metadata"]["domainName"], "https://acme.example.com");
    assert!(body["data"]["content"].is_object());
}

#[tokio::test]
async fn delivery_body_prefers_the_mirror_artifact() {
    let repo = MockJobCopyRepo::with_jobs(vec![test_job("job-1", JobStatus::Pending)]);
    let mirror = MockMirror::default();
    mirror
        .files
        .lock()
        .unwrap()
        .insert("job-1".to_owned(), serde_json::json!({"from": "mirror"}));
    let transport = MockTransport::default();
    let uc = usecase(
        repo,
        mirror,
        transport.clone(),
        MockArchive::default(),
        policy(),
    );

    uc.execute(input("job-1")).await.unwrap();

    let sends = transport.sends.lock().unwrap();
    assert_eq!(sends[0].1, serde_json::json!({"from": "mirror"}));
}

#[tokio::test]
async fn archival_keys_delivered_payloads_deterministically() {
    let repo = MockJobCopyRepo::with_jobs(vec![test_job("job-1", JobStatus::Pending)]);
    let archive = MockArchive::default();
    let mut policy = policy();
    policy.archive_enabled = true;
    let uc = usecase(
        repo.clone(),
        MockMirror::default(),
        MockTransport::default(),
        archive.clone(),
        policy,
    );

    let outcome = uc.execute(input("job-1")).await.unwrap();

    assert!(matches!(
        outcome,
        DispatchOutcome::Delivered { archived: true, .. }
    ));
    assert_eq!(archive.keys(), vec!["delivered/job-1".to_owned()]);
    assert!(repo.job("job-1").unwrap().archived);
}

#[tokio::test]
async fn archival_failure_never_reverts_a_delivered_status() {
    let repo = MockJobCopyRepo::with_jobs(vec![test_job("job-1", JobStatus::Pending)]);
    let archive = MockArchive {
        fail: true,
        ..MockArchive::default()
    };
    let mut policy = policy();
    policy.archive_enabled = true;
    let uc = usecase(
        repo.clone(),
        MockMirror::default(),
        MockTransport::default(),
        archive,
        policy,
    );

    let outcome = uc.execute(input("job-1")).await.unwrap();

    assert!(matches!(
        outcome,
        DispatchOutcome::Delivered {
            archived: false,
            ..
        }
    ));
    let job = repo.job("job-1").unwrap();
    assert!(!job.archived);
    assert_eq!(job.status, JobStatus::SiteCheckPending);
}

#[tokio::test]
async fn missing_job_is_not_found() {
    let uc = usecase(
        MockJobCopyRepo::default(),
        MockMirror::default(),
        MockTransport::default(),
        MockArchive::default(),
        policy(),
    );

    let err = uc.execute(input("ghost")).await.unwrap_err();
    assert!(matches!(err, DeliveryServiceError::NotFound));
}
