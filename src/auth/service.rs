use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::auth::password;
use crate::auth::token::{self, IssuedToken, TOKEN_LENGTH};
use crate::auth::tokens::Token;
use crate::errors::{AuthError, RejectReason};
use crate::state::AppState;
use crate::users::repo::User;

/// Scheme expected in the Authorization header, matched exactly.
const BEARER: &str = "Bearer";

/// Login sequence: resolve the account, match the password, check the
/// active flag, mint a token and persist its digest. Whatever token the
/// user held before dies with the insert. A token that failed to persist is
/// never handed out; it could not validate later.
pub async fn login(
    state: &AppState,
    email: &str,
    password_plain: &str,
) -> Result<(IssuedToken, User), AuthError> {
    let user = User::get_by_email(&state.db, email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let matched = password::verify_password(password_plain, &user.password_hash)?;
    if !matched {
        warn!(user_id = user.id, "password mismatch");
        return Err(AuthError::InvalidCredentials);
    }

    if !user.active {
        warn!(user_id = user.id, "login attempt on inactive account");
        return Err(AuthError::AccountInactive);
    }

    let ttl = Duration::hours(state.config.auth.token_ttl_hours);
    let issued = token::issue(user.id, ttl)?;

    Token::insert(&state.db, &issued, &user).await?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok((issued, user))
}

/// Deletes the presented token. "Already gone" and "deleted now" look the
/// same to the client, so only store failures surface. The delete is
/// idempotent, which buys a single retry when the store misses its
/// deadline.
pub async fn logout(state: &AppState, plaintext: &str) -> Result<(), AuthError> {
    match Token::delete_by_token(&state.db, plaintext).await {
        Err(AuthError::StoreTimeout) => Token::delete_by_token(&state.db, plaintext).await,
        other => other,
    }
}

/// Standalone validity check with the same one-retry-on-deadline policy as
/// the other idempotent reads. Issuance never retries.
pub async fn validate(state: &AppState, plaintext: &str) -> Result<bool, AuthError> {
    match Token::is_valid(&state.db, plaintext).await {
        Err(AuthError::StoreTimeout) => Token::is_valid(&state.db, plaintext).await,
        other => other,
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
/// Exactly two space-separated parts, exact scheme, fixed token length; all
/// checked before any store round trip.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, RejectReason> {
    let header = header.ok_or(RejectReason::Missing)?;
    let mut parts = header.split(' ');
    let (scheme, candidate) = (parts.next(), parts.next());
    if parts.next().is_some() {
        return Err(RejectReason::Malformed);
    }
    let (Some(scheme), Some(candidate)) = (scheme, candidate) else {
        return Err(RejectReason::Malformed);
    };
    if scheme != BEARER || candidate.len() != TOKEN_LENGTH {
        return Err(RejectReason::Malformed);
    }
    Ok(candidate)
}

/// Full authorization decision for a gated request. Every failure collapses
/// to the same client-visible 401; the reason lands in the logs only.
pub async fn authorize_bearer(state: &AppState, header: Option<&str>) -> Result<User, AuthError> {
    let candidate = parse_bearer(header).map_err(AuthError::Unauthorized)?;

    let row = Token::get_by_token(&state.db, candidate)
        .await?
        .ok_or(AuthError::Unauthorized(RejectReason::Invalid))?;

    if row.is_expired(OffsetDateTime::now_utc()) {
        return Err(AuthError::Unauthorized(RejectReason::Expired));
    }

    let user = User::get_one(&state.db, row.user_id)
        .await?
        .ok_or(AuthError::Unauthorized(RejectReason::Invalid))?;

    if !user.active {
        return Err(AuthError::Unauthorized(RejectReason::Inactive));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 26 characters, same length the generator produces
    const SAMPLE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    #[test]
    fn parse_bearer_accepts_well_formed_header() {
        let header = format!("Bearer {SAMPLE}");
        assert_eq!(parse_bearer(Some(header.as_str())), Ok(SAMPLE));
    }

    #[test]
    fn parse_bearer_rejects_missing_header() {
        assert_eq!(parse_bearer(None), Err(RejectReason::Missing));
    }

    #[test]
    fn parse_bearer_rejects_wrong_scheme() {
        let basic = format!("Basic {SAMPLE}");
        assert_eq!(parse_bearer(Some(basic.as_str())), Err(RejectReason::Malformed));
        // scheme match is exact, no case folding
        let lower = format!("bearer {SAMPLE}");
        assert_eq!(parse_bearer(Some(lower.as_str())), Err(RejectReason::Malformed));
    }

    #[test]
    fn parse_bearer_rejects_wrong_shape() {
        assert_eq!(parse_bearer(Some("Bearer")), Err(RejectReason::Malformed));
        let trailing = format!("Bearer {SAMPLE} extra");
        assert_eq!(
            parse_bearer(Some(trailing.as_str())),
            Err(RejectReason::Malformed)
        );
        let double_space = format!("Bearer  {SAMPLE}");
        assert_eq!(
            parse_bearer(Some(double_space.as_str())),
            Err(RejectReason::Malformed)
        );
    }

    #[test]
    fn parse_bearer_rejects_wrong_length() {
        assert_eq!(parse_bearer(Some("Bearer short")), Err(RejectReason::Malformed));
        let long = format!("Bearer {SAMPLE}A");
        assert_eq!(parse_bearer(Some(long.as_str())), Err(RejectReason::Malformed));
    }

    #[tokio::test]
    async fn authorize_short_circuits_before_the_store_on_bad_headers() {
        // lazy pool: these must fail at parse time, never reaching a query
        let state = AppState::fake();

        let missing = authorize_bearer(&state, None).await.unwrap_err();
        assert!(matches!(
            missing,
            AuthError::Unauthorized(RejectReason::Missing)
        ));

        let malformed = authorize_bearer(&state, Some("Token abcdef"))
            .await
            .unwrap_err();
        assert!(matches!(
            malformed,
            AuthError::Unauthorized(RejectReason::Malformed)
        ));

        let short = authorize_bearer(&state, Some("Bearer tooshort"))
            .await
            .unwrap_err();
        assert!(matches!(
            short,
            AuthError::Unauthorized(RejectReason::Malformed)
        ));
    }
}
