use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hours a soft-deleted job copy stays in quarantine before the retention
/// purge destroys it.
pub const RETENTION_HOURS: i64 = 48;

/// Cap on persisted delivery failure reasons.
pub const LAST_ERROR_MAX_LEN: usize = 2000;

/// Lifecycle status of a job copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Delivered,
    DeliveryFailed,
    SiteCheckPending,
    SiteCheckOk,
    SiteCheckFailed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::DeliveryFailed => "delivery_failed",
            Self::SiteCheckPending => "site_check_pending",
            Self::SiteCheckOk => "site_check_ok",
            Self::SiteCheckFailed => "site_check_failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "delivered" => Some(Self::Delivered),
            "delivery_failed" => Some(Self::DeliveryFailed),
            "site_check_pending" => Some(Self::SiteCheckPending),
            "site_check_ok" => Some(Self::SiteCheckOk),
            "site_check_failed" => Some(Self::SiteCheckFailed),
            _ => None,
        }
    }

    /// Terminal with respect to dispatch: re-dispatch needs an explicit
    /// override once a send attempt has been recorded.
    pub fn is_dispatched(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// How the payload reaches the target site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// A human supplies the delivery URL through the admin boundary.
    #[default]
    Manual,
    /// Relay through a Zapier webhook; prefilled from config when available.
    Zapier,
    /// Reserved. Rejected until a persisted URL-mapping source exists.
    Automatic,
    /// Compose base URL + target path and POST straight to the site.
    Direct,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Zapier => "zapier",
            Self::Automatic => "automatic",
            Self::Direct => "direct",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "zapier" => Some(Self::Zapier),
            "automatic" => Some(Self::Automatic),
            "direct" => Some(Self::Direct),
            _ => None,
        }
    }
}

/// Site-check escalation phase. `Initial` polls frequently for roughly an
/// hour; `Long` polls hourly until the site responds or the job is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteCheckPhase {
    #[default]
    Initial,
    Long,
}

impl SiteCheckPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Long => "long",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "initial" => Some(Self::Initial),
            "long" => Some(Self::Long),
            _ => None,
        }
    }
}

/// Canonical job copy as the rest of the service sees it.
#[derive(Debug, Clone, Serialize)]
pub struct JobCopy {
    pub id: Uuid,
    pub job_id: String,
    pub client_name: String,
    pub payload: serde_json::Value,
    pub status: JobStatus,
    pub delivery_mode: DeliveryMode,
    pub delivery_url: Option<String>,
    pub on_disk_path: Option<String>,
    pub archived: bool,
    pub last_error: Option<String>,
    pub preview_url: Option<String>,
    pub site_check: SiteCheckSchedule,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Durable schedule state for post-delivery reachability checks.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SiteCheckSchedule {
    pub attempts_made: i32,
    pub phase: SiteCheckPhase,
    pub next_check_at: Option<DateTime<Utc>>,
}

/// A quarantined job copy awaiting purge (or restore).
#[derive(Debug, Clone, Serialize)]
pub struct DeletedJobCopy {
    pub id: Uuid,
    pub job_id: String,
    pub client_name: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub delivery_mode: String,
    pub delivery_url: Option<String>,
    pub on_disk_path: Option<String>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub deleted_at: DateTime<Utc>,
    pub destroy_after: DateTime<Utc>,
}

/// Fields set when a new job copy is ingested.
#[derive(Debug, Clone)]
pub struct NewJobCopy {
    pub job_id: String,
    pub client_name: String,
    pub payload: serde_json::Value,
    pub delivery_mode: DeliveryMode,
}

/// A failed send attempt (non-2xx, timeout, or connect error). Recorded on
/// the job as `delivery_failed` + `last_error`, never raised to the caller.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{reason}")]
pub struct DeliveryFailure {
    pub reason: String,
}

impl DeliveryFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        let mut reason = reason.into();
        // Cap by bytes, but only ever cut on a char boundary: the reason can
        // carry arbitrary response-body text.
        if reason.len() > LAST_ERROR_MAX_LEN {
            let mut end = LAST_ERROR_MAX_LEN;
            while !reason.is_char_boundary(end) {
                end -= 1;
            }
            reason.truncate(end);
        }
        Self { reason }
    }
}

/// A single failed site-check probe. Counted against the schedule, not
/// escalated.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{reason}")]
pub struct ProbeFailure {
    pub reason: String,
}

impl ProbeFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
