use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::JobStatus;
use crate::error::DeliveryServiceError;
use crate::state::AppState;
use crate::usecase::ingest::{IngestJobCopyInput, IngestJobCopyUseCase};

// ── POST /webhook/jobs ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IngestJobRequest {
    /// Caller-supplied identifier; re-posting the same id re-ingests the job.
    /// Minted server-side when absent.
    pub job_id: Option<String>,
    pub client_name: String,
    pub payload: serde_json::Value,
}

#[derive(Serialize)]
pub struct IngestJobResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub on_disk_path: Option<String>,
}

pub async fn ingest_job(
    State(state): State<AppState>,
    Json(body): Json<IngestJobRequest>,
) -> Result<(StatusCode, Json<IngestJobResponse>), DeliveryServiceError> {
    let job_id = body
        .job_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let usecase = IngestJobCopyUseCase {
        repo: state.repo(),
        mirror: state.mirror(),
        default_mode: state.config.delivery_mode,
    };
    let copy = usecase
        .execute(IngestJobCopyInput {
            job_id,
            client_name: body.client_name,
            payload: body.payload,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(IngestJobResponse {
            job_id: copy.job_id,
            status: copy.status,
            on_disk_path: copy.on_disk_path,
        }),
    ))
}
