use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::{AuthError, RejectReason};
use crate::users::repo::User;

/// The authenticated identity attached by the bearer gate. Handlers behind
/// the gate extract it to learn who is acting.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // only present when require_auth ran in front of the route
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::Unauthorized(RejectReason::Missing))
    }
}
