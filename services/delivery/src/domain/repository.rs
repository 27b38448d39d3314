#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use crate::domain::types::{
    DeletedJobCopy, DeliveryFailure, DeliveryMode, JobCopy, JobStatus, NewJobCopy, ProbeFailure,
    SiteCheckSchedule,
};
use crate::error::DeliveryServiceError;

/// Pagination + filter for admin listings.
#[derive(Debug, Clone, Default)]
pub struct JobCopyFilter {
    pub client_substring: Option<String>,
    pub status: Option<JobStatus>,
    pub page: u64,
    pub page_size: u64,
}

/// Fields written by a status transition. `status` and `last_error` are
/// always applied; the rest only when `Some`.
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub last_error: Option<String>,
    pub delivery_mode: Option<DeliveryMode>,
    pub delivery_url: Option<String>,
    pub preview_url: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub archived: Option<bool>,
    pub site_check: Option<SiteCheckSchedule>,
}

/// What the retention purge destroyed, so mirror files can be cleaned up.
#[derive(Debug, Clone)]
pub struct PurgedCopy {
    pub job_id: String,
    pub on_disk_path: Option<String>,
}

/// Repository for canonical job copies and their quarantine table.
///
/// All persistence goes through here; the dispatcher and site-check
/// scheduler never touch storage directly.
pub trait JobCopyRepository: Send + Sync {
    /// Create (or overwrite, on re-ingest of the same `job_id`) a canonical
    /// record with status `pending`.
    async fn upsert(&self, copy: &NewJobCopy) -> Result<JobCopy, DeliveryServiceError>;

    /// Find a live (not soft-deleted) job copy.
    async fn find(&self, job_id: &str) -> Result<Option<JobCopy>, DeliveryServiceError>;

    /// Whether the job currently sits in quarantine.
    async fn is_quarantined(&self, job_id: &str) -> Result<bool, DeliveryServiceError>;

    async fn list(&self, filter: &JobCopyFilter)
    -> Result<(Vec<JobCopy>, u64), DeliveryServiceError>;

    async fn list_deleted(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<DeletedJobCopy>, u64), DeliveryServiceError>;

    /// Record a best-effort mirror write against the canonical row.
    async fn set_on_disk_path(&self, job_id: &str, path: &str)
    -> Result<(), DeliveryServiceError>;

    /// Supply the delivery URL for `manual`/`zapier` jobs.
    async fn set_delivery_url(&self, job_id: &str, url: &str)
    -> Result<JobCopy, DeliveryServiceError>;

    /// Compare-and-set status transition: applied only while the row's
    /// current status is one of `expected`. Returns `false` when no row
    /// matched (gone, quarantined, or concurrently transitioned).
    async fn transition(
        &self,
        job_id: &str,
        expected: &[JobStatus],
        status: JobStatus,
        update: StatusUpdate,
    ) -> Result<bool, DeliveryServiceError>;

    /// Jobs whose site-check is due at `now`, oldest first.
    async fn due_site_checks(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<JobCopy>, DeliveryServiceError>;

    /// Move the record to quarantine, stamping `deleted_at = now`.
    /// Idempotent: a no-op once the job is already quarantined.
    async fn soft_delete(&self, job_id: &str, now: DateTime<Utc>)
    -> Result<(), DeliveryServiceError>;

    /// Destroy every quarantined record whose retention window has elapsed
    /// at `now`. Safe to run concurrently; an already-purged record is a
    /// no-op for the loser.
    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<PurgedCopy>, DeliveryServiceError>;
}

/// On-disk payload mirror. Strictly best-effort: errors here are downgraded
/// to warnings at the call site, never failures of the canonical operation.
pub trait PayloadMirror: Send + Sync {
    /// Write the mirror artifact, returning its path.
    async fn save(&self, job_id: &str, payload: &serde_json::Value) -> anyhow::Result<String>;

    /// Read the mirror artifact. `Ok(None)` when the file is missing.
    async fn load(&self, job_id: &str) -> anyhow::Result<Option<serde_json::Value>>;

    /// Delete the mirror artifact; missing files are fine.
    async fn remove(&self, job_id: &str) -> anyhow::Result<()>;
}

/// Cold-storage archive for delivered payloads. Best-effort, like the mirror.
pub trait ArchiveStore: Send + Sync {
    async fn put(&self, key: &str, payload: &serde_json::Value) -> anyhow::Result<()>;
}

/// Outbound delivery call to the resolved target.
pub trait DeliveryTransport: Send + Sync {
    async fn send(&self, url: &str, body: &serde_json::Value) -> Result<(), DeliveryFailure>;
}

/// A single bounded reachability check against the delivered site.
pub trait SiteProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<(), ProbeFailure>;
}
