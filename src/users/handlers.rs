use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::dto::MessageResponse;
use crate::auth::extractors::CurrentUser;
use crate::auth::handlers::is_valid_email;
use crate::auth::password;
use crate::auth::tokens::Token;
use crate::errors::AuthError;
use crate::state::AppState;
use crate::users::dto::SaveUserRequest;
use crate::users::repo::User;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/save", post(save_user))
        .route("/users/:id", get(get_user).delete(delete_user))
        .route("/users/:id/logout", post(deactivate_user))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AuthError> {
    let users = User::get_all(&state.db).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AuthError> {
    let user = User::get_one(&state.db, id).await?.ok_or(AuthError::NotFound)?;
    Ok(Json(user))
}

#[instrument(skip(state, admin, payload))]
pub async fn save_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Json(mut payload): Json<SaveUserRequest>,
) -> Result<Json<User>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        return Err(AuthError::Validation("invalid email"));
    }
    if let Some(plain) = payload.password.as_deref() {
        if plain.len() < 8 {
            return Err(AuthError::Validation("password too short"));
        }
    }

    if payload.id == 0 {
        let Some(plain) = payload.password.as_deref() else {
            return Err(AuthError::Validation("password is required for a new user"));
        };
        if User::get_by_email(&state.db, &payload.email).await?.is_some() {
            return Err(AuthError::Conflict("email already registered"));
        }
        let hash = password::hash_password(&state.config.auth, plain)?;
        let user = User::insert(
            &state.db,
            &payload.email,
            &payload.first_name,
            &payload.last_name,
            &hash,
            payload.active,
        )
        .await?;
        info!(admin_id = admin.id, user_id = user.id, "user created");
        return Ok(Json(user));
    }

    let mut user = User::get_one(&state.db, payload.id)
        .await?
        .ok_or(AuthError::NotFound)?;
    let deactivating = user.active && !payload.active;
    user.email = payload.email;
    user.first_name = payload.first_name;
    user.last_name = payload.last_name;
    user.active = payload.active;
    user.update(&state.db).await?;

    if let Some(plain) = payload.password.as_deref() {
        let hash = password::hash_password(&state.config.auth, plain)?;
        User::reset_password(&state.db, user.id, &hash).await?;
    }

    // a user losing the active flag loses their session with it
    if deactivating {
        Token::delete_all_for_user(&state.db, user.id).await?;
    }

    info!(admin_id = admin.id, user_id = user.id, "user updated");
    Ok(Json(user))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AuthError> {
    User::delete_by_id(&state.db, id).await?;
    info!(admin_id = admin.id, user_id = id, "user deleted");
    Ok(Json(MessageResponse {
        message: "user deleted",
    }))
}

/// One administrative action: flip the account inactive and revoke every
/// token it holds.
#[instrument(skip(state, admin))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AuthError> {
    let mut user = User::get_one(&state.db, id).await?.ok_or(AuthError::NotFound)?;
    user.active = false;
    user.update(&state.db).await?;
    Token::delete_all_for_user(&state.db, user.id).await?;
    info!(
        admin_id = admin.id,
        user_id = user.id,
        "user deactivated and logged out"
    );
    Ok(Json(MessageResponse {
        message: "user logged out and set to inactive",
    }))
}
