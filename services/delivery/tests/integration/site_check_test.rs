use chrono::{Duration, Utc};

use procontent_delivery::domain::repository::JobCopyRepository;
use procontent_delivery::domain::types::{JobCopy, JobStatus, SiteCheckPhase, SiteCheckSchedule};
use procontent_delivery::usecase::site_check::{SiteCheckPolicy, SiteCheckUseCase};

use crate::helpers::{MockJobCopyRepo, MockProbe, test_job};

fn policy() -> SiteCheckPolicy {
    SiteCheckPolicy {
        initial_attempts: 12,
        initial_interval_seconds: 300,
        long_interval_seconds: 3600,
    }
}

/// A job delivered earlier whose probe is now due.
fn due_job(job_id: &str, attempts_made: i32, phase: SiteCheckPhase) -> JobCopy {
    let mut job = test_job(job_id, JobStatus::SiteCheckPending);
    job.preview_url = Some("https://acme-widgets.sites.example.net".to_owned());
    job.site_check = SiteCheckSchedule {
        attempts_made,
        phase,
        next_check_at: Some(Utc::now() - Duration::seconds(1)),
    };
    job
}

fn usecase(repo: MockJobCopyRepo, probe: MockProbe) -> SiteCheckUseCase<MockJobCopyRepo, MockProbe> {
    SiteCheckUseCase {
        repo,
        probe,
        policy: policy(),
    }
}

#[tokio::test]
async fn reachable_site_ends_the_schedule() {
    let repo = MockJobCopyRepo::with_jobs(vec![due_job("job-1", 3, SiteCheckPhase::Initial)]);
    let probe = MockProbe::up();
    let uc = usecase(repo.clone(), probe.clone());

    let stats = uc.run_due(Utc::now(), 50).await.unwrap();

    assert_eq!(stats.probed, 1);
    assert_eq!(stats.reachable, 1);
    assert_eq!(
        probe.calls.lock().unwrap()[0],
        "https://acme-widgets.sites.example.net"
    );

    let job = repo.job("job-1").unwrap();
    assert_eq!(job.status, JobStatus::SiteCheckOk);
    assert_eq!(job.site_check.attempts_made, 4);
    assert_eq!(job.site_check.next_check_at, None);
}

#[tokio::test]
async fn unreachable_site_reschedules_at_the_initial_interval() {
    let now = Utc::now();
    let repo = MockJobCopyRepo::with_jobs(vec![due_job("job-1", 0, SiteCheckPhase::Initial)]);
    let uc = usecase(repo.clone(), MockProbe::unreachable());

    let stats = uc.run_due(now, 50).await.unwrap();

    assert_eq!(stats.unreachable, 1);
    let job = repo.job("job-1").unwrap();
    assert_eq!(job.status, JobStatus::SiteCheckPending);
    assert_eq!(job.site_check.attempts_made, 1);
    assert_eq!(job.site_check.phase, SiteCheckPhase::Initial);
    assert_eq!(
        job.site_check.next_check_at,
        Some(now + Duration::seconds(300))
    );
    assert_eq!(job.last_error.as_deref(), Some("connection refused"));
}

#[tokio::test]
async fn exhausting_the_initial_phase_escalates_to_hourly_checks() {
    let now = Utc::now();
    let repo = MockJobCopyRepo::with_jobs(vec![due_job("job-1", 11, SiteCheckPhase::Initial)]);
    let uc = usecase(repo.clone(), MockProbe::unreachable());

    uc.run_due(now, 50).await.unwrap();

    let job = repo.job("job-1").unwrap();
    assert_eq!(job.status, JobStatus::SiteCheckFailed);
    assert_eq!(job.site_check.attempts_made, 12);
    assert_eq!(job.site_check.phase, SiteCheckPhase::Long);
    assert_eq!(
        job.site_check.next_check_at,
        Some(now + Duration::seconds(3600))
    );
}

#[tokio::test]
async fn persisted_schedule_state_resumes_after_a_restart() {
    // A fresh usecase over the same repo stands in for a restarted worker:
    // nothing about the sequence lives in memory.
    let now = Utc::now();
    let repo = MockJobCopyRepo::with_jobs(vec![due_job("job-1", 5, SiteCheckPhase::Initial)]);

    let first = usecase(repo.clone(), MockProbe::unreachable());
    first.run_due(now, 50).await.unwrap();
    drop(first);

    // Make the rescheduled probe due again, then run a brand-new worker.
    {
        let mut live = repo.live.lock().unwrap();
        live[0].site_check.next_check_at = Some(now - Duration::seconds(1));
    }
    let second = usecase(repo.clone(), MockProbe::unreachable());
    second.run_due(now, 50).await.unwrap();

    let job = repo.job("job-1").unwrap();
    assert_eq!(job.site_check.attempts_made, 7);
    assert_eq!(job.site_check.phase, SiteCheckPhase::Initial);
}

#[tokio::test]
async fn future_checks_are_left_alone() {
    let mut job = due_job("job-1", 0, SiteCheckPhase::Initial);
    job.site_check.next_check_at = Some(Utc::now() + Duration::seconds(120));
    let repo = MockJobCopyRepo::with_jobs(vec![job]);
    let probe = MockProbe::unreachable();
    let uc = usecase(repo, probe.clone());

    let stats = uc.run_due(Utc::now(), 50).await.unwrap();

    assert_eq!(stats.probed, 0);
    assert_eq!(probe.call_count(), 0);
}

#[tokio::test]
async fn soft_deleting_a_job_cancels_its_schedule() {
    let repo = MockJobCopyRepo::with_jobs(vec![due_job("job-1", 2, SiteCheckPhase::Initial)]);
    repo.soft_delete("job-1", Utc::now()).await.unwrap();

    let probe = MockProbe::up();
    let uc = usecase(repo, probe.clone());
    let stats = uc.run_due(Utc::now(), 50).await.unwrap();

    assert_eq!(stats.probed, 0);
    assert_eq!(probe.call_count(), 0);
}

#[tokio::test]
async fn due_check_without_a_probe_url_halts_instead_of_spinning() {
    let mut job = due_job("job-1", 2, SiteCheckPhase::Initial);
    job.preview_url = None;
    let repo = MockJobCopyRepo::with_jobs(vec![job]);
    let probe = MockProbe::up();
    let uc = usecase(repo.clone(), probe.clone());

    let stats = uc.run_due(Utc::now(), 50).await.unwrap();

    assert_eq!(stats.skipped, 1);
    assert_eq!(probe.call_count(), 0);
    let job = repo.job("job-1").unwrap();
    assert_eq!(job.status, JobStatus::SiteCheckFailed);
    assert_eq!(job.site_check.next_check_at, None);
}
