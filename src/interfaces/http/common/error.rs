//! Domain error to HTTP response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::shared::errors::DomainError;

/// Handler error. Wraps a [`DomainError`] so handlers can use `?`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::InvalidDateRange(_) | DomainError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::RoomUnavailable { .. }
            | DomainError::AlreadyPaid { .. }
            | DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
            DomainError::ReferenceGenerationExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            DomainError::Storage { message, .. } => {
                error!(error = %message, "Storage failure while handling request");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };
        let body = ApiResponse::<()>::error(self.0.kind(), message);
        (status, Json(body)).into_response()
    }
}
