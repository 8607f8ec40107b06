//! # Web API Error Types
//!
//! Maps the engine's error taxonomy onto HTTP responses with stable,
//! machine-readable error codes in the JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::{CreateError, TransitionError};
use crate::resources::ResourceError;
use crate::state_machine::errors::{
    AssignError, AuthzError, ResolveError, StateError, ValidationError,
};

/// Web API specific errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    BadRequest {
        code: &'static str,
        message: String,
    },

    #[error("{message}")]
    ServiceUnavailable { message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
            ),
            ApiError::Forbidden { message } => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", message.clone())
            }
            ApiError::NotFound { message } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone())
            }
            ApiError::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, *code, message.clone())
            }
            ApiError::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                message.clone(),
            ),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<StateError> for ApiError {
    fn from(err: StateError) -> Self {
        match &err {
            StateError::NotFound(_) => Self::NotFound {
                message: err.to_string(),
            },
            StateError::AlreadyFinalized(_) => Self::BadRequest {
                code: "ALREADY_FINALIZED",
                message: err.to_string(),
            },
            StateError::InvalidTransition { .. } => Self::BadRequest {
                code: "INVALID_TRANSITION",
                message: err.to_string(),
            },
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        Self::Forbidden {
            message: err.to_string(),
        }
    }
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        Self::ServiceUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<CreateError> for ApiError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::Validation(e) => e.into(),
            CreateError::Resource(e) => e.into(),
        }
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::State(e) => e.into(),
            TransitionError::Resource(e) => e.into(),
        }
    }
}

impl From<AssignError> for ApiError {
    fn from(err: AssignError) -> Self {
        match err {
            AssignError::Unauthorized(e) => e.into(),
            AssignError::SelfAssignment => Self::BadRequest {
                code: "SELF_ASSIGNMENT",
                message: err.to_string(),
            },
            AssignError::DuplicateAssignment => Self::BadRequest {
                code: "DUPLICATE_ASSIGNMENT",
                message: err.to_string(),
            },
            AssignError::State(e) => e.into(),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Unauthorized => Self::Forbidden {
                message: err.to_string(),
            },
            ResolveError::AssignmentNotFound(_) => Self::NotFound {
                message: err.to_string(),
            },
            ResolveError::AlreadyResolved => Self::BadRequest {
                code: "ALREADY_RESOLVED",
                message: err.to_string(),
            },
            ResolveError::InvalidReport(_) => Self::BadRequest {
                code: "INVALID_REPORT",
                message: err.to_string(),
            },
            ResolveError::State(e) => e.into(),
            ResolveError::Resource(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request_with_code() {
        let api: ApiError = ValidationError::DuplicatePending.into();
        assert!(matches!(
            api,
            ApiError::BadRequest {
                code: "DUPLICATE_PENDING",
                ..
            }
        ));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let api: ApiError = StateError::NotFound("10123456".into()).into();
        assert!(matches!(api, ApiError::NotFound { .. }));
    }

    #[test]
    fn test_authz_maps_to_forbidden() {
        let api: ApiError = AssignError::Unauthorized(AuthzError::Unauthorized {
            user: "u-1".into(),
            capability: "can_assign".into(),
        })
        .into();
        assert!(matches!(api, ApiError::Forbidden { .. }));
    }

    #[test]
    fn test_resolve_unauthorized_maps_to_forbidden() {
        let api: ApiError = ResolveError::Unauthorized.into();
        assert!(matches!(api, ApiError::Forbidden { .. }));
    }
}
