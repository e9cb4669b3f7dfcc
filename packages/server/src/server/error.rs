//! HTTP error responses.
//!
//! Pipeline errors become a status code plus a JSON body:
//!
//! ```json
//! { "error": { "code": "no_results", "message": "No search results found" } }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use searcrawl::PipelineError;
use serde::Serialize;

/// Handler error wrapping a [`PipelineError`].
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_urls: Vec<String>,
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn body(&self) -> ErrorBody {
        let failed_urls = match &self.0 {
            PipelineError::AllFetchesFailed { failed_urls } => failed_urls.clone(),
            _ => Vec::new(),
        };

        ErrorBody {
            error: ErrorDetail {
                code: self.0.error_code(),
                message: self.0.to_string(),
                failed_urls,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.0.error_code(), error = %self.0, "Request failed");
        } else {
            tracing::warn!(code = self.0.error_code(), error = %self.0, "Request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}
