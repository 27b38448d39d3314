use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::repository::{JobCopyRepository, SiteProbe, StatusUpdate};
use crate::domain::types::{JobCopy, JobStatus, SiteCheckPhase, SiteCheckSchedule};
use crate::error::DeliveryServiceError;

/// Escalation policy for post-delivery reachability checks.
#[derive(Debug, Clone, Copy)]
pub struct SiteCheckPolicy {
    pub initial_attempts: i32,
    pub initial_interval_seconds: u64,
    pub long_interval_seconds: u64,
}

impl SiteCheckPolicy {
    fn interval(&self, phase: SiteCheckPhase) -> Duration {
        let secs = match phase {
            SiteCheckPhase::Initial => self.initial_interval_seconds,
            SiteCheckPhase::Long => self.long_interval_seconds,
        };
        Duration::seconds(secs as i64)
    }
}

/// Schedule state after one more failed probe. Exhausting the initial phase
/// escalates to the long phase; the long phase never ends on its own.
pub fn reschedule_after_failure(
    prev: SiteCheckSchedule,
    policy: &SiteCheckPolicy,
    now: DateTime<Utc>,
) -> SiteCheckSchedule {
    let attempts_made = prev.attempts_made + 1;
    let phase = match prev.phase {
        SiteCheckPhase::Initial if attempts_made >= policy.initial_attempts => {
            SiteCheckPhase::Long
        }
        phase => phase,
    };
    SiteCheckSchedule {
        attempts_made,
        phase,
        next_check_at: Some(now + policy.interval(phase)),
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct SiteCheckStats {
    pub probed: usize,
    pub reachable: usize,
    pub unreachable: usize,
    pub skipped: usize,
}

/// Probe every job whose site-check is due and advance its persisted
/// schedule. Driven by the worker role's periodic poll; all schedule state
/// lives on the job row, so restarts resume mid-sequence.
pub struct SiteCheckUseCase<R, P>
where
    R: JobCopyRepository,
    P: SiteProbe,
{
    pub repo: R,
    pub probe: P,
    pub policy: SiteCheckPolicy,
}

impl<R, P> SiteCheckUseCase<R, P>
where
    R: JobCopyRepository,
    P: SiteProbe,
{
    pub async fn run_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<SiteCheckStats, DeliveryServiceError> {
        let due = self.repo.due_site_checks(now, limit).await?;
        let mut stats = SiteCheckStats::default();
        for job in due {
            match self.check_one(&job, now).await? {
                ProbeResult::Reachable => stats.reachable += 1,
                ProbeResult::Unreachable => stats.unreachable += 1,
                ProbeResult::Skipped => stats.skipped += 1,
            }
            stats.probed += 1;
        }
        Ok(stats)
    }

    async fn check_one(
        &self,
        job: &JobCopy,
        now: DateTime<Utc>,
    ) -> Result<ProbeResult, DeliveryServiceError> {
        // Eligibility can change between poll and probe (soft delete moves
        // the row out from under us); the CAS transition below then matches
        // nothing and the probe result is dropped silently.
        let expected = [JobStatus::SiteCheckPending, JobStatus::SiteCheckFailed];
        if !expected.contains(&job.status) {
            return Ok(ProbeResult::Skipped);
        }

        let Some(url) = job.preview_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            tracing::warn!(job_id = %job.job_id, "due site check has no probe URL, halting schedule");
            self.repo
                .transition(
                    &job.job_id,
                    &expected,
                    JobStatus::SiteCheckFailed,
                    StatusUpdate {
                        site_check: Some(SiteCheckSchedule {
                            attempts_made: job.site_check.attempts_made,
                            phase: job.site_check.phase,
                            next_check_at: None,
                        }),
                        ..Default::default()
                    },
                )
                .await?;
            return Ok(ProbeResult::Skipped);
        };

        match self.probe.probe(url).await {
            Ok(()) => {
                self.repo
                    .transition(
                        &job.job_id,
                        &expected,
                        JobStatus::SiteCheckOk,
                        StatusUpdate {
                            site_check: Some(SiteCheckSchedule {
                                attempts_made: job.site_check.attempts_made + 1,
                                phase: job.site_check.phase,
                                next_check_at: None,
                            }),
                            ..Default::default()
                        },
                    )
                    .await?;
                tracing::info!(job_id = %job.job_id, url, "site reachable");
                Ok(ProbeResult::Reachable)
            }
            Err(failure) => {
                let schedule = reschedule_after_failure(job.site_check, &self.policy, now);
                let status = if schedule.phase == SiteCheckPhase::Long {
                    JobStatus::SiteCheckFailed
                } else {
                    JobStatus::SiteCheckPending
                };
                self.repo
                    .transition(
                        &job.job_id,
                        &expected,
                        status,
                        StatusUpdate {
                            last_error: Some(failure.reason.clone()),
                            site_check: Some(schedule),
                            ..Default::default()
                        },
                    )
                    .await?;
                tracing::info!(
                    job_id = %job.job_id,
                    url,
                    attempts = schedule.attempts_made,
                    phase = schedule.phase.as_str(),
                    reason = %failure.reason,
                    "site not reachable yet"
                );
                Ok(ProbeResult::Unreachable)
            }
        }
    }
}

enum ProbeResult {
    Reachable,
    Unreachable,
    Skipped,
}
