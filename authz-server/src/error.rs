//! API error mapping
//!
//! Translates service-layer errors into HTTP status codes with a uniform
//! JSON error body.

use authz_service::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use policy_engine::PolicyError;
use relation_store::StoreError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Standard API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error_type: String,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error type returned by every handler
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(ServiceError::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self.0 {
            ServiceError::Store(StoreError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "not_found", msg.clone())
            }
            ServiceError::Store(StoreError::AlreadyExists(msg)) => {
                (StatusCode::CONFLICT, "already_exists", msg.clone())
            }
            ServiceError::Store(StoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "validation", msg.clone())
            }
            ServiceError::Policy(PolicyError::MalformedPolicy(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "malformed_policy",
                msg.clone(),
            ),
            other => {
                error!(error = %other, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error".to_string(),
                )
            }
        };

        let body = ApiErrorResponse {
            error_type: error_type.to_string(),
            message,
            timestamp: chrono::Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(StoreError::NotFound("subject missing".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_duplicate_maps_to_409() {
        let err = ApiError::from(StoreError::AlreadyExists("contract exists".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_malformed_policy_maps_to_422() {
        let err = ApiError(ServiceError::Policy(PolicyError::MalformedPolicy(
            "policy has no condition".to_string(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_storage_failure_maps_to_500() {
        let err = ApiError::from(StoreError::Sqlx(sqlx::Error::PoolClosed));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
