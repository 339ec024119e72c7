use axum::Router;

use crate::state::AppState;

pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;
pub mod tokens;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
