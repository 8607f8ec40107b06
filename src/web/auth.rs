//! # Actor Identity Extraction
//!
//! The authentication layer in front of this service resolves the caller and
//! forwards their identity in the `X-User-Id` header. A missing or empty
//! header yields 401; the engine itself never sees unauthenticated traffic.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::response_types::ApiError;
use crate::models::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller of a handler.
#[derive(Debug, Clone)]
pub struct ActorId(pub UserId);

impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| ActorId(value.to_string()))
            .ok_or(ApiError::Unauthenticated)
    }
}
