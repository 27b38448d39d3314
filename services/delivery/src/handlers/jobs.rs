use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::repository::{JobCopyFilter, JobCopyRepository};
use crate::domain::types::{DeliveryMode, JobCopy, JobStatus, SiteCheckSchedule};
use crate::error::DeliveryServiceError;
use crate::state::AppState;
use crate::usecase::softdelete::SoftDeleteJobCopyUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct JobCopyResponse {
    pub job_id: String,
    pub client_name: String,
    pub status: JobStatus,
    pub delivery_mode: DeliveryMode,
    pub delivery_url: Option<String>,
    pub preview_url: Option<String>,
    pub on_disk_path: Option<String>,
    pub archived: bool,
    pub last_error: Option<String>,
    pub site_check: SiteCheckSchedule,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Canonical payload, detail view only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl JobCopyResponse {
    fn from_copy(copy: JobCopy, include_payload: bool) -> Self {
        Self {
            job_id: copy.job_id,
            client_name: copy.client_name,
            status: copy.status,
            delivery_mode: copy.delivery_mode,
            delivery_url: copy.delivery_url,
            preview_url: copy.preview_url,
            on_disk_path: copy.on_disk_path,
            archived: copy.archived,
            last_error: copy.last_error,
            site_check: copy.site_check,
            delivered_at: copy.delivered_at,
            created_at: copy.created_at,
            updated_at: copy.updated_at,
            payload: include_payload.then_some(copy.payload),
        }
    }
}

#[derive(Serialize)]
pub struct JobCopyListResponse {
    pub items: Vec<JobCopyResponse>,
    pub total: u64,
}

#[derive(Serialize)]
pub struct DeletedJobCopyResponse {
    pub job_id: String,
    pub client_name: String,
    pub status: String,
    pub delivery_mode: String,
    pub deleted_at: DateTime<Utc>,
    pub destroy_after: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DeletedJobCopyListResponse {
    pub items: Vec<DeletedJobCopyResponse>,
    pub total: u64,
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct JobListQuery {
    pub per_page: Option<u64>,
    pub page: Option<u64>,
    pub client: Option<String>,
    pub status: Option<String>,
}

// ── GET /jobs ────────────────────────────────────────────────────────────────

pub async fn get_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<JobCopyListResponse>, DeliveryServiceError> {
    let status = match query.status.as_deref() {
        Some(s) => Some(JobStatus::parse(s).ok_or_else(|| {
            DeliveryServiceError::Configuration(format!("unknown status filter: {s}"))
        })?),
        None => None,
    };
    let filter = JobCopyFilter {
        client_substring: query.client,
        status,
        page: query.page.unwrap_or(1),
        page_size: query.per_page.unwrap_or(25),
    };

    let (copies, total) = state.repo().list(&filter).await?;
    Ok(Json(JobCopyListResponse {
        items: copies
            .into_iter()
            .map(|copy| JobCopyResponse::from_copy(copy, false))
            .collect(),
        total,
    }))
}

// ── GET /jobs/deleted ────────────────────────────────────────────────────────

pub async fn get_deleted_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<DeletedJobCopyListResponse>, DeliveryServiceError> {
    let (copies, total) = state
        .repo()
        .list_deleted(query.page.unwrap_or(1), query.per_page.unwrap_or(25))
        .await?;
    Ok(Json(DeletedJobCopyListResponse {
        items: copies
            .into_iter()
            .map(|copy| DeletedJobCopyResponse {
                job_id: copy.job_id,
                client_name: copy.client_name,
                status: copy.status,
                delivery_mode: copy.delivery_mode,
                deleted_at: copy.deleted_at,
                destroy_after: copy.destroy_after,
            })
            .collect(),
        total,
    }))
}

// ── GET /jobs/{job_id} ───────────────────────────────────────────────────────

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobCopyResponse>, DeliveryServiceError> {
    let copy = state
        .repo()
        .find(&job_id)
        .await?
        .ok_or(DeliveryServiceError::NotFound)?;
    Ok(Json(JobCopyResponse::from_copy(copy, true)))
}

// ── DELETE /jobs/{job_id} ────────────────────────────────────────────────────

pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<StatusCode, DeliveryServiceError> {
    let usecase = SoftDeleteJobCopyUseCase { repo: state.repo() };
    usecase.execute(&job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
