use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::validation::ValidationError;

pub type ApiResponse<T> = Result<T, ApiError>;

/// Every non-2xx answer of the API is one of these, rendered as
/// `{"success": false, "error": <code>, "message": <text>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Request not understood.")]
    BadRequest,
    #[error("Resource not found.")]
    NotFound,
    #[error("Method not allowed.")]
    MethodNotAllowed,
    #[error("Unprocessable request.")]
    UnprocessableEntity,
    #[error("Internal server error.")]
    Internal,
}

impl ApiError {
    pub fn status(self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::BAD_REQUEST => Some(ApiError::BadRequest),
            StatusCode::NOT_FOUND => Some(ApiError::NotFound),
            StatusCode::METHOD_NOT_ALLOWED => Some(ApiError::MethodNotAllowed),
            StatusCode::UNPROCESSABLE_ENTITY => Some(ApiError::UnprocessableEntity),
            StatusCode::INTERNAL_SERVER_ERROR => Some(ApiError::Internal),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::UnknownField { .. }
            | StoreError::InvalidValue { .. }
            | StoreError::MissingField(_) => {
                tracing::info!(%error, "Rejected attributes");
                ApiError::BadRequest
            }
            StoreError::Database(_) | StoreError::Migration(_) => {
                tracing::error!(%error, "Storage failure");
                ApiError::Internal
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::Store(error) => error.into(),
            error => {
                tracing::info!(%error, "Invalid question");
                ApiError::BadRequest
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::info!(%rejection, "Rejected JSON body");
        match rejection {
            JsonRejection::JsonDataError(_) => ApiError::UnprocessableEntity,
            _ => ApiError::BadRequest,
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::info!(%rejection, "Rejected path");
        match rejection {
            PathRejection::FailedToDeserializePathParams(_) => ApiError::NotFound,
            _ => ApiError::Internal,
        }
    }
}

/// Rewrites the framework's own error responses (405 from method routing,
/// path and query rejections) into the JSON envelope.
pub async fn json_error_envelope(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
    if is_json {
        return response;
    }
    match ApiError::from_status(status) {
        Some(error) => error.into_response(),
        None => response,
    }
}
