use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo::User;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body carrying a bare token (logout, standalone validation).
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// Response returned after login. The token plaintext appears here and
/// nowhere else.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expiry: OffsetDateTime,
    pub user: PublicUser,
}

/// Result of the standalone validation endpoint.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
}

/// Acknowledgement body for endpoints with nothing else to say.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Client-facing user: everything except the password digest.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            active: user.active,
            created_at: user.created_at,
        }
    }
}
