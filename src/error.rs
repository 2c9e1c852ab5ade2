//! Application error taxonomy.
//!
//! Every failure a visitor can trigger is surfaced as an inline notice in the
//! page rather than aborting the session. JSON endpoints map the same errors
//! to status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Errors produced while handling a UI turn.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A static asset (logo, style file) could not be read.
    #[error("Asset not found: {path}")]
    AssetNotFound {
        /// Path that was looked up.
        path: String,
    },

    /// An uploaded file was refused (wrong kind, too large, too many).
    #[error("Upload rejected for '{file_name}': {reason}")]
    UploadRejected {
        /// Original file name as sent by the browser.
        file_name: String,
        /// Human readable reason.
        reason: String,
    },

    /// The response collaborator failed to produce an answer.
    #[error("Response generation failed: {0}")]
    ResponseGenerationFailed(String),

    /// A placeholder action was invoked.
    #[error("Not implemented yet: {0}")]
    NotImplemented(&'static str),

    /// No session exists with the given id.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// The multipart body could not be read.
    #[error("Multipart error: {0}")]
    Multipart(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AssetNotFound { .. } => "ASSET_NOT_FOUND",
            Self::UploadRejected { .. } => "UPLOAD_REJECTED",
            Self::ResponseGenerationFailed(_) => "RESPONSE_GENERATION_FAILED",
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::Multipart(_) => "MULTIPART_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// HTTP status used by the JSON API.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::AssetNotFound { .. } | Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::UploadRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::ResponseGenerationFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error as an inline notice block.
    #[must_use]
    pub fn notice_html(&self) -> String {
        let tone = match self {
            Self::NotImplemented(_) => "notice-info",
            Self::UploadRejected { .. } | Self::AssetNotFound { .. } => "notice-warning",
            _ => "notice-error",
        };
        format!(
            r#"<div class="notice {tone}" role="alert" data-code="{code}">{message}</div>"#,
            code = self.code(),
            message = html_escape::encode_text(&self.to_string()),
        )
    }
}

/// Error body for the JSON API.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        } else {
            tracing::warn!(error = %self, code = self.code(), "Request rejected");
        }
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
