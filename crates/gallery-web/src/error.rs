use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gallery_common::error::CommonError;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("manifest unavailable: {0}")]
    ManifestUnavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid path segment: {0:?}")]
    InvalidPath(String),

    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::ManifestUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::TemplateRead { .. } | AppError::Common(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown inline to the user. Recovery is a manual reload.
    fn user_message(&self) -> String {
        match self {
            AppError::ManifestUnavailable(_) => {
                "Failed to load templates. Please try again later.".to_string()
            }
            AppError::NotFound(what) => format!("Not found: {what}"),
            AppError::InvalidPath(_) => "Invalid path.".to_string(),
            AppError::TemplateRead { .. } => "Failed to load template details.".to_string(),
            AppError::Config(_) | AppError::Common(_) => "Internal error.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = serde_json::json!({ "error": self.user_message() });
        (status, Json(body)).into_response()
    }
}
