//! Mapping of explorer errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kbx_error::KbxError;
use serde::{Deserialize, Serialize};

/// JSON body of an error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// An explorer error on its way to the client.
///
/// Invalid requests become `400 Bad Request`; everything else is a
/// `500 Internal Server Error`.
#[derive(Debug)]
pub struct ApiError(pub KbxError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_invalid_request() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<KbxError> for ApiError {
    fn from(error: KbxError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = if status == StatusCode::BAD_REQUEST {
            "invalid_request"
        } else {
            tracing::error!(error = %self.0, kind = self.0.code(), "Request failed");
            "internal_error"
        };

        let body = ErrorResponse {
            error: self.0.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
