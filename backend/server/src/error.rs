use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use query::QueryError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Session missing or expired")]
    Unauthorized,

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] reqwest::Error),

    #[error("Upstream sent an unreadable body: {0}")]
    UpstreamBody(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Invalid(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload | AppError::Invalid(_) | AppError::Query(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Upstream { status, .. } => *status,
            AppError::UpstreamUnavailable(_) | AppError::UpstreamBody(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("{self}");
        } else {
            warn!("{status}: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
