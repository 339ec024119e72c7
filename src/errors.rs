use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Why the request authorizer turned a bearer token away. Internal only:
/// every kind collapses to the same client-visible 401, and the kind itself
/// goes no further than the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Missing,
    Malformed,
    Invalid,
    Expired,
    Inactive,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "auth_missing",
            Self::Malformed => "auth_malformed",
            Self::Invalid => "auth_invalid",
            Self::Expired => "auth_expired",
            Self::Inactive => "auth_inactive",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password share one kind so the response
    /// cannot be used to enumerate accounts.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account is inactive")]
    AccountInactive,
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("store operation failed")]
    Persist(#[source] sqlx::Error),
    #[error("store operation exceeded the {}s deadline", crate::db::DB_TIMEOUT.as_secs())]
    StoreTimeout,
    #[error("system randomness unavailable: {0}")]
    RandomSource(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("malformed password digest: {0}")]
    MalformedDigest(String),
    #[error("unauthorized: {}", .0.as_str())]
    Unauthorized(RejectReason),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials | AuthError::AccountInactive => {
                warn!(kind = %self, "login rejected");
                (StatusCode::UNAUTHORIZED, "invalid email or password")
            }
            AuthError::Unauthorized(reason) => {
                warn!(reason = reason.as_str(), "request rejected");
                (StatusCode::UNAUTHORIZED, "invalid auth credentials")
            }
            AuthError::NotFound => (StatusCode::NOT_FOUND, "user not found"),
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, *msg),
            AuthError::Conflict(msg) => (StatusCode::CONFLICT, *msg),
            AuthError::Persist(e) => {
                error!(error = %e, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
            AuthError::StoreTimeout => {
                error!("store deadline exceeded");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
            AuthError::RandomSource(e) => {
                error!(error = %e, "entropy source failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
            AuthError::Hash(e) | AuthError::MalformedDigest(e) => {
                error!(error = %e, "password hashing failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        let body = json!({ "error": true, "message": message });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_collapse_to_unauthorized() {
        let reasons = [
            RejectReason::Missing,
            RejectReason::Malformed,
            RejectReason::Invalid,
            RejectReason::Expired,
            RejectReason::Inactive,
        ];
        for reason in reasons {
            let resp = AuthError::Unauthorized(reason).into_response();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(
            AuthError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::AccountInactive.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn inactive_account_reads_like_bad_credentials() {
        // same status either way; the distinct kind is for the logs only
        let a = AuthError::InvalidCredentials.into_response();
        let b = AuthError::AccountInactive.into_response();
        assert_eq!(a.status(), b.status());
    }

    #[test]
    fn infrastructure_failures_are_server_errors() {
        assert_eq!(
            AuthError::StoreTimeout.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::Persist(sqlx::Error::PoolClosed)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::RandomSource("no entropy".into())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_and_conflict_keep_their_messages() {
        assert_eq!(
            AuthError::Validation("password too short")
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Conflict("email already registered")
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
    }
}
