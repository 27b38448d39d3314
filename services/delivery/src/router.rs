use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use procontent_core::health::{healthz, readyz};
use procontent_core::middleware::request_id_layer;

use crate::handlers::{
    deliveries::{dispatch_job, purge_expired, set_delivery_url},
    jobs::{delete_job, get_deleted_jobs, get_job, get_jobs},
    webhook::ingest_job,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Ingestion
        .route("/webhook/jobs", post(ingest_job))
        // Admin: job copies
        .route("/jobs", get(get_jobs))
        .route("/jobs/deleted", get(get_deleted_jobs))
        .route("/jobs/{job_id}", get(get_job))
        .route("/jobs/{job_id}", delete(delete_job))
        // Admin: delivery
        .route("/jobs/{job_id}/delivery-url", post(set_delivery_url))
        .route("/jobs/{job_id}/dispatch", post(dispatch_job))
        // Admin: retention
        .route("/admin/purge-expired", post(purge_expired))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
