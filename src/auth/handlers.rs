use axum::{extract::State, routing::post, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::dto::{
    LoginRequest, LoginResponse, MessageResponse, PublicUser, TokenRequest, ValidateResponse,
};
use crate::auth::service;
use crate::errors::AuthError;
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/validate-token", post(validate_token))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "login with malformed email");
        return Err(AuthError::InvalidCredentials);
    }

    let (issued, user) = service::login(&state, &payload.email, &payload.password).await?;

    Ok(Json(LoginResponse {
        token: issued.plaintext,
        expiry: issued.expiry,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    service::logout(&state, &payload.token).await?;
    info!("user logged out");
    Ok(Json(MessageResponse {
        message: "logged out",
    }))
}

/// Lets a third party check a token without it authorizing their own
/// request. Store failures are a 500 here, never `valid: false`.
#[instrument(skip(state, payload))]
pub async fn validate_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<ValidateResponse>, AuthError> {
    let valid = service::validate(&state, &payload.token).await?;
    Ok(Json(ValidateResponse { valid }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("me@here.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("me@here"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@address.com"));
        assert!(!is_valid_email(""));
    }
}
