use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::extractors::CurrentUser;
use crate::auth::service;
use crate::errors::AuthError;
use crate::state::AppState;

/// Bearer gate for the administrative routes. On success the resolved user
/// rides the request extensions into the handler; on any failure the
/// request short-circuits with a uniform 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let user = service::authorize_bearer(&state, header.as_deref()).await?;
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
