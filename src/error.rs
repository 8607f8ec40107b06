//! # Unified Error Type
//!
//! Every operational error in the crate converts into [`RiegoError`] via
//! `From`, so embedding callers can hold one error type while the engine
//! components keep their precise sub-taxonomies.

use thiserror::Error;

use crate::resources::ResourceError;
use crate::state_machine::errors::{
    AssignError, AuthzError, ResolveError, StateError, ValidationError,
};

/// Failure of the creation operation: either the candidate broke a
/// validation rule or the resource layer could not be reached.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Failure of a status transition, including the valve write-back that an
/// approved flow decision triggers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl From<TransitionError> for ResolveError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::State(e) => Self::State(e),
            TransitionError::Resource(e) => Self::Resource(e),
        }
    }
}

/// Top-level error for the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiegoError {
    #[error(transparent)]
    Create(#[from] CreateError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Assign(#[from] AssignError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, RiegoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_error_from_validation() {
        let err: CreateError = ValidationError::DuplicatePending.into();
        assert!(matches!(err, CreateError::Validation(_)));

        let top: RiegoError = err.into();
        assert!(matches!(top, RiegoError::Create(_)));
    }

    #[test]
    fn test_transition_error_into_resolve() {
        let err: TransitionError = StateError::AlreadyFinalized("10123456".into()).into();
        let resolve: ResolveError = err.into();
        assert_eq!(
            resolve,
            ResolveError::State(StateError::AlreadyFinalized("10123456".into()))
        );
    }
}
