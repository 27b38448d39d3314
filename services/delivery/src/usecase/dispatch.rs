use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;

use crate::domain::repository::{
    ArchiveStore, DeliveryTransport, JobCopyRepository, PayloadMirror, StatusUpdate,
};
use crate::domain::resolver::{self, DeliveryTargets, ResolveInput, ResolvedTarget};
use crate::domain::types::{DeliveryMode, JobCopy, JobStatus, SiteCheckPhase, SiteCheckSchedule};
use crate::error::DeliveryServiceError;

/// Dispatch-relevant configuration, snapshotted from `DeliveryConfig`.
#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    pub targets: DeliveryTargets,
    pub archive_enabled: bool,
    pub delivered_prefix: String,
    pub site_check_initial_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Delivered {
        delivery_url: String,
        archived: bool,
        site_check_scheduled: bool,
    },
    Failed {
        reason: String,
    },
}

pub struct DispatchDeliveryInput {
    pub job_id: String,
    /// Explicit operator override to re-dispatch a terminal job.
    pub override_terminal: bool,
}

/// Send a stored payload to its resolved target and record the outcome.
///
/// Dispatch is single-shot: a failed send marks the job `delivery_failed`
/// and stops. Re-dispatch is an operator decision, because targets are
/// third-party systems whose idempotency cannot be assumed.
pub struct DispatchDeliveryUseCase<R, M, T, A>
where
    R: JobCopyRepository,
    M: PayloadMirror,
    T: DeliveryTransport,
    A: ArchiveStore,
{
    pub repo: R,
    pub mirror: M,
    pub transport: T,
    pub archive: A,
    pub policy: DispatchPolicy,
}

impl<R, M, T, A> DispatchDeliveryUseCase<R, M, T, A>
where
    R: JobCopyRepository,
    M: PayloadMirror,
    T: DeliveryTransport,
    A: ArchiveStore,
{
    pub async fn execute(
        &self,
        input: DispatchDeliveryInput,
    ) -> Result<DispatchOutcome, DeliveryServiceError> {
        let job = self
            .repo
            .find(&input.job_id)
            .await?
            .ok_or(DeliveryServiceError::NotFound)?;

        if job.status.is_dispatched() && !input.override_terminal {
            return Err(DeliveryServiceError::AlreadyProcessed);
        }

        let target = self.resolve_target(&job)?;
        let body = self.delivery_body(&job).await;

        // The CAS transition below is filtered on the status observed here,
        // so a concurrent dispatch or soft-delete makes the losing side's
        // update match zero rows instead of double-recording.
        let expected = [job.status];

        match self.transport.send(&target, &body).await {
            Ok(()) => {
                let archived = self.maybe_archive(&job).await;
                let preview = resolver::preview_url(resolve_input(&job), &self.policy.targets);
                let (status, site_check) = match &preview {
                    Some(_) => (
                        JobStatus::SiteCheckPending,
                        Some(SiteCheckSchedule {
                            attempts_made: 0,
                            phase: SiteCheckPhase::Initial,
                            next_check_at: Some(
                                Utc::now()
                                    + Duration::seconds(
                                        self.policy.site_check_initial_interval_seconds as i64,
                                    ),
                            ),
                        }),
                    ),
                    None => {
                        tracing::warn!(
                            job_id = %job.job_id,
                            "no probe URL resolvable, skipping site verification"
                        );
                        (JobStatus::Delivered, None)
                    }
                };
                let applied = self
                    .repo
                    .transition(
                        &job.job_id,
                        &expected,
                        status,
                        StatusUpdate {
                            last_error: None,
                            delivery_mode: Some(job.delivery_mode),
                            delivery_url: Some(target.clone()),
                            preview_url: preview,
                            delivered_at: Some(Utc::now()),
                            archived: Some(archived),
                            site_check,
                        },
                    )
                    .await?;
                if !applied {
                    return Err(DeliveryServiceError::Conflict);
                }
                tracing::info!(job_id = %job.job_id, url = %target, archived, "delivery sent");
                Ok(DispatchOutcome::Delivered {
                    delivery_url: target,
                    archived,
                    site_check_scheduled: matches!(status, JobStatus::SiteCheckPending),
                })
            }
            Err(failure) => {
                let applied = self
                    .repo
                    .transition(
                        &job.job_id,
                        &expected,
                        JobStatus::DeliveryFailed,
                        StatusUpdate {
                            last_error: Some(failure.reason.clone()),
                            delivery_url: Some(target),
                            ..Default::default()
                        },
                    )
                    .await?;
                if !applied {
                    return Err(DeliveryServiceError::Conflict);
                }
                tracing::warn!(job_id = %job.job_id, reason = %failure.reason, "delivery failed");
                Ok(DispatchOutcome::Failed {
                    reason: failure.reason,
                })
            }
        }
    }

    fn resolve_target(&self, job: &JobCopy) -> Result<String, DeliveryServiceError> {
        if let Some(url) = job.delivery_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.to_owned());
        }
        match resolver::resolve(job.delivery_mode, resolve_input(job), &self.policy.targets)? {
            ResolvedTarget::Url(url) => Ok(url),
            ResolvedTarget::AwaitingUrl => Err(DeliveryServiceError::Configuration(format!(
                "delivery URL required before dispatch in {} mode",
                job.delivery_mode.as_str()
            ))),
        }
    }

    /// Payload body for the wire: mirror artifact when readable, canonical
    /// record otherwise.
    async fn delivery_body(&self, job: &JobCopy) -> serde_json::Value {
        let payload = match self.mirror.load(&job.job_id).await {
            Ok(Some(payload)) => payload,
            Ok(None) => job.payload.clone(),
            Err(e) => {
                tracing::warn!(job_id = %job.job_id, error = %e, "mirror read failed, using canonical payload");
                job.payload.clone()
            }
        };
        match job.delivery_mode {
            DeliveryMode::Zapier => json!({
                "data": { "content": payload },
                "metadata": {
                    "businessName": job.client_name,
                    "domainName": job_base_url(job).unwrap_or_default(),
                },
            }),
            _ => payload,
        }
    }

    async fn maybe_archive(&self, job: &JobCopy) -> bool {
        if !self.policy.archive_enabled {
            return false;
        }
        let key = format!("{}{}", self.policy.delivered_prefix, job.job_id);
        match self.archive.put(&key, &job.payload).await {
            Ok(()) => {
                tracing::info!(job_id = %job.job_id, key, "payload archived");
                true
            }
            Err(e) => {
                // Delivery already succeeded; archival never reverts it.
                tracing::warn!(job_id = %job.job_id, error = %e, "payload archive failed");
                false
            }
        }
    }
}

fn job_base_url(job: &JobCopy) -> Option<&str> {
    job.payload
        .get("job_details")
        .and_then(|d| d.get("base_url"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn resolve_input(job: &JobCopy) -> ResolveInput<'_> {
    ResolveInput {
        client_name: &job.client_name,
        base_url: job_base_url(job),
        namespace: job
            .payload
            .get("job_details")
            .and_then(|d| d.get("namespace"))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty()),
    }
}
