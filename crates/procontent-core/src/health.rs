use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

/// Handler for `GET /healthz` — liveness check.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Handler for `GET /readyz` — readiness check (override per service as needed).
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
