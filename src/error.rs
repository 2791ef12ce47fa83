use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::entry::ValidationError;
use crate::store::StoreError;
use crate::worktime::duration::InvalidInterval;
use crate::worktime::view::ExportError;

/// Why a bearer token was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    Missing,
    #[error("Authorization header must start with Bearer")]
    NotBearer,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Malformed,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Missing => "token_missing",
            AuthError::NotBearer => "token_not_bearer",
            AuthError::Expired => "token_expired",
            AuthError::Malformed => "token_invalid",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("No fields provided for update")]
    EmptyUpdate,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Invalid login ID or password")]
    InvalidCredentials,
    #[error("Internal Server Error")]
    Store(#[from] StoreError),
    #[error("Internal Server Error")]
    Internal(String),
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Attendance entry not found")]
    pub error: String,
    #[schema(example = "not_found")]
    pub code: String,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::EmptyUpdate => "empty_update",
            ApiError::NotFound(_) => "not_found",
            ApiError::Auth(e) => e.code(),
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Store(_) => "store_unavailable",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::EmptyUpdate => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Auth(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            code: self.code().to_string(),
        })
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<InvalidInterval> for ApiError {
    fn from(e: InvalidInterval) -> Self {
        ApiError::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::EmptyUpdate.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NotFound("Attendance entry").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Auth(AuthError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Store(StoreError::Poisoned).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_causes_have_distinct_codes() {
        let codes = [
            AuthError::Missing,
            AuthError::NotBearer,
            AuthError::Expired,
            AuthError::Malformed,
        ]
        .map(|e| ApiError::from(e).code());
        assert_eq!(
            codes,
            ["token_missing", "token_not_bearer", "token_expired", "token_invalid"]
        );
    }

    #[test]
    fn store_failures_hide_details() {
        let err = ApiError::Store(StoreError::Poisoned);
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn missing_fields_are_listed() {
        let err = ApiError::from(ValidationError::MissingFields(vec!["name", "site_name"]));
        assert_eq!(err.to_string(), "missing required fields: name, site_name");
    }
}
