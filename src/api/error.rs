use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimizer::DispatchError;

/// API error types that can be returned from handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown power plant type: {0}")]
    UnknownUnitKind(String),

    #[error("Infeasible load: {0}")]
    InfeasibleDemand(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::ValidationError(_)
            | ApiError::UnknownUnitKind(_) => StatusCode::BAD_REQUEST,
            ApiError::InfeasibleDemand(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::ValidationError(_) => "ValidationError",
            ApiError::UnknownUnitKind(_) => "UnknownUnitKind",
            ApiError::InfeasibleDemand(_) => "InfeasibleDemand",
            ApiError::InternalError(_) => "InternalServerError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        let message = match &self {
            ApiError::InternalError(_) => {
                tracing::error!(error = %self, "API error occurred");
                "An internal error occurred".to_string()
            }
            ApiError::InfeasibleDemand(_) => {
                tracing::warn!(error = %self, "Infeasible load");
                self.to_string()
            }
            _ => {
                tracing::debug!(error = %self, "Client error");
                self.to_string()
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::UnknownUnitKind { .. } => ApiError::UnknownUnitKind(error.to_string()),
            DispatchError::InfeasibleDemand { .. } => ApiError::InfeasibleDemand(error.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        ApiError::InternalError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::InfeasibleReason;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnknownUnitKind("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InfeasibleDemand("test".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::InternalError("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_dispatch_error_conversion() {
        let err: ApiError = DispatchError::UnknownUnitKind {
            unit: "pv1".into(),
            kind: "solar".into(),
        }
        .into();
        assert_eq!(err.error_type(), "UnknownUnitKind");

        let err: ApiError = DispatchError::InfeasibleDemand {
            demand_mw: 10.0,
            reason: InfeasibleReason::NoFeasibleCommitment,
        }
        .into();
        assert_eq!(err.error_type(), "InfeasibleDemand");
        assert!(err.to_string().contains("10 MW"));
    }
}
