use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::repository::JobCopyRepository;
use crate::domain::types::JobStatus;
use crate::error::DeliveryServiceError;
use crate::state::AppState;
use crate::usecase::dispatch::{DispatchDeliveryInput, DispatchDeliveryUseCase, DispatchOutcome};
use crate::usecase::retention::PurgeExpiredUseCase;

// ── POST /jobs/{job_id}/delivery-url ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetDeliveryUrlRequest {
    pub delivery_url: String,
}

#[derive(Serialize)]
pub struct SetDeliveryUrlResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub delivery_url: Option<String>,
}

pub async fn set_delivery_url(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(body): Json<SetDeliveryUrlRequest>,
) -> Result<Json<SetDeliveryUrlResponse>, DeliveryServiceError> {
    let url = body.delivery_url.trim();
    if url.is_empty() {
        return Err(DeliveryServiceError::Configuration(
            "delivery_url must not be blank".into(),
        ));
    }
    let copy = state.repo().set_delivery_url(&job_id, url).await?;
    Ok(Json(SetDeliveryUrlResponse {
        job_id: copy.job_id,
        status: copy.status,
        delivery_url: copy.delivery_url,
    }))
}

// ── POST /jobs/{job_id}/dispatch ─────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct DispatchQuery {
    /// Re-dispatch a job that already recorded a send attempt.
    #[serde(default)]
    pub r#override: bool,
}

pub async fn dispatch_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<DispatchQuery>,
) -> Result<Json<DispatchOutcome>, DeliveryServiceError> {
    let usecase = DispatchDeliveryUseCase {
        repo: state.repo(),
        mirror: state.mirror(),
        transport: state.transport(),
        archive: state.archive(),
        policy: state.dispatch_policy(),
    };
    let outcome = usecase
        .execute(DispatchDeliveryInput {
            job_id,
            override_terminal: query.r#override,
        })
        .await?;
    Ok(Json(outcome))
}

// ── POST /admin/purge-expired ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PurgeExpiredResponse {
    pub purged: u64,
}

pub async fn purge_expired(
    State(state): State<AppState>,
) -> Result<Json<PurgeExpiredResponse>, DeliveryServiceError> {
    let usecase = PurgeExpiredUseCase {
        repo: state.repo(),
        mirror: state.mirror(),
    };
    let purged = usecase.execute(Utc::now()).await?;
    Ok(Json(PurgeExpiredResponse { purged }))
}
