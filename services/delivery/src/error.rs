use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Delivery service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryServiceError {
    #[error("job copy not found")]
    NotFound,
    #[error("concurrent update lost the race")]
    Conflict,
    #[error("job already dispatched")]
    AlreadyProcessed,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("delivery mode not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DeliveryServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::AlreadyProcessed => "ALREADY_PROCESSED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for DeliveryServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict | Self::AlreadyProcessed => StatusCode::CONFLICT,
            Self::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Only internal errors carry an anyhow chain worth logging; request
        // method/uri/status are already on the trace span.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
