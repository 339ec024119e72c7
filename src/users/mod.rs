use axum::{middleware, Router};

use crate::auth::middleware::require_auth;
use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;

/// Administrative routes; every one sits behind the bearer gate. Login,
/// logout and validation stay outside it.
pub fn router(state: AppState) -> Router<AppState> {
    handlers::user_routes().route_layer(middleware::from_fn_with_state(state, require_auth))
}
