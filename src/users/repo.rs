use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::db::with_deadline;
use crate::errors::AuthError;

/// User record. The password digest stays server-side, and the active flag
/// is a bool everywhere except the integer column it maps to in the SQL
/// below.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub async fn get_all(db: &PgPool) -> Result<Vec<User>, AuthError> {
        with_deadline(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, first_name, last_name, password_hash,
                       active <> 0 AS active, created_at, updated_at
                FROM users
                ORDER BY last_name, email
                "#,
            )
            .fetch_all(db),
        )
        .await
    }

    /// Login key lookup.
    pub async fn get_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
        with_deadline(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, first_name, last_name, password_hash,
                       active <> 0 AS active, created_at, updated_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(db),
        )
        .await
    }

    pub async fn get_one(db: &PgPool, id: i64) -> Result<Option<User>, AuthError> {
        with_deadline(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, first_name, last_name, password_hash,
                       active <> 0 AS active, created_at, updated_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(db),
        )
        .await
    }

    /// Administrative insert; the password arrives already hashed.
    pub async fn insert(
        db: &PgPool,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
        active: bool,
    ) -> Result<User, AuthError> {
        with_deadline(
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (email, first_name, last_name, password_hash, active)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, email, first_name, last_name, password_hash,
                          active <> 0 AS active, created_at, updated_at
                "#,
            )
            .bind(email)
            .bind(first_name)
            .bind(last_name)
            .bind(password_hash)
            .bind(i32::from(active))
            .fetch_one(db),
        )
        .await
    }

    /// Persists profile edits: email, names and the active flag.
    pub async fn update(&self, db: &PgPool) -> Result<(), AuthError> {
        with_deadline(async {
            sqlx::query(
                r#"
                UPDATE users
                SET email = $1, first_name = $2, last_name = $3, active = $4,
                    updated_at = now()
                WHERE id = $5
                "#,
            )
            .bind(&self.email)
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(i32::from(self.active))
            .bind(self.id)
            .execute(db)
            .await
            .map(|_| ())
        })
        .await
    }

    /// Swaps in a freshly hashed password.
    pub async fn reset_password(db: &PgPool, id: i64, password_hash: &str) -> Result<(), AuthError> {
        with_deadline(async {
            sqlx::query(
                r#"
                UPDATE users
                SET password_hash = $1, updated_at = now()
                WHERE id = $2
                "#,
            )
            .bind(password_hash)
            .bind(id)
            .execute(db)
            .await
            .map(|_| ())
        })
        .await
    }

    /// Token rows go with the user (cascade on the foreign key).
    pub async fn delete_by_id(db: &PgPool, id: i64) -> Result<(), AuthError> {
        with_deadline(async {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(db)
                .await
                .map(|_| ())
        })
        .await
    }
}
