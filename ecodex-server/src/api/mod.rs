//! HTTP API handlers

pub mod chat;
pub mod entries;
pub mod health;
pub mod identify;
pub mod stats;

pub use chat::chat_routes;
pub use entries::entries_routes;
pub use health::health_routes;
pub use identify::identify_routes;
pub use stats::stats_routes;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;

/// Authenticated user identity, forwarded by the upstream auth layer in
/// the `X-User-Id` header. The id is trusted unconditionally; verifying
/// it is the auth collaborator's job, not ours.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let user_id = Uuid::parse_str(header)
            .map_err(|_| ApiError::Unauthorized("Invalid X-User-Id header".to_string()))?;

        Ok(AuthUser(user_id))
    }
}
