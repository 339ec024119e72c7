use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::auth::token::{self, IssuedToken};
use crate::db::with_deadline;
use crate::errors::AuthError;
use crate::users::repo::User;

/// Token row as persisted. The digest never serializes outward.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Token {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub token_hash: Vec<u8>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub expiry: OffsetDateTime,
}

impl Token {
    /// A token authorizes only while its expiry is strictly in the future.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expiry <= now
    }

    /// Persists a fresh token, revoking whatever the user held before.
    /// Delete and insert ride one transaction so a concurrent validation
    /// never observes two live rows for the same user, and a failed insert
    /// cannot pass for success.
    pub async fn insert(db: &PgPool, issued: &IssuedToken, user: &User) -> Result<(), AuthError> {
        with_deadline(async {
            let mut tx = db.begin().await?;
            sqlx::query("DELETE FROM tokens WHERE user_id = $1")
                .bind(issued.user_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                r#"
                INSERT INTO tokens (user_id, email, token_hash, expiry)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(issued.user_id)
            .bind(&user.email)
            .bind(&issued.digest)
            .bind(issued.expiry)
            .execute(&mut *tx)
            .await?;
            tx.commit().await
        })
        .await
    }

    /// Resolves a presented plaintext by recomputing its digest; the
    /// plaintext itself never reaches the query. Matching is on exact
    /// digest, not on any per-user row-count assumption.
    pub async fn get_by_token(db: &PgPool, plaintext: &str) -> Result<Option<Token>, AuthError> {
        let digest = token::digest(plaintext);
        with_deadline(
            sqlx::query_as::<_, Token>(
                r#"
                SELECT id, user_id, email, token_hash, created_at, updated_at, expiry
                FROM tokens
                WHERE token_hash = $1
                "#,
            )
            .bind(digest)
            .fetch_optional(db),
        )
        .await
    }

    /// Logout path. Deleting a token that is already gone is a no-op.
    pub async fn delete_by_token(db: &PgPool, plaintext: &str) -> Result<(), AuthError> {
        let digest = token::digest(plaintext);
        with_deadline(async {
            sqlx::query("DELETE FROM tokens WHERE token_hash = $1")
                .bind(digest)
                .execute(db)
                .await
                .map(|_| ())
        })
        .await
    }

    /// Administrative revocation; idempotent like the single delete.
    pub async fn delete_all_for_user(db: &PgPool, user_id: i64) -> Result<(), AuthError> {
        with_deadline(async {
            sqlx::query("DELETE FROM tokens WHERE user_id = $1")
                .bind(user_id)
                .execute(db)
                .await
                .map(|_| ())
        })
        .await
    }

    /// Boolean validity check: unknown, expired and inactive-owner tokens
    /// are all plain `false`. Only infrastructure failures surface as
    /// errors, so "invalid" can never mask "unavailable".
    pub async fn is_valid(db: &PgPool, plaintext: &str) -> Result<bool, AuthError> {
        let Some(row) = Token::get_by_token(db, plaintext).await? else {
            return Ok(false);
        };
        if row.is_expired(OffsetDateTime::now_utc()) {
            return Ok(false);
        }
        let Some(user) = User::get_one(db, row.user_id).await? else {
            return Ok(false);
        };
        Ok(user.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn sample(expiry: OffsetDateTime) -> Token {
        let now = OffsetDateTime::now_utc();
        Token {
            id: 1,
            user_id: 1,
            email: "me@here.com".into(),
            token_hash: vec![0; 32],
            created_at: now,
            updated_at: now,
            expiry,
        }
    }

    #[test]
    fn expiry_boundary_is_strict() {
        let now = OffsetDateTime::now_utc();
        assert!(sample(now).is_expired(now));
        assert!(sample(now - Duration::seconds(1)).is_expired(now));
        assert!(!sample(now + Duration::seconds(1)).is_expired(now));
    }

    #[test]
    fn digest_never_serializes() {
        let json = serde_json::to_string(&sample(OffsetDateTime::now_utc())).expect("serialize");
        assert!(!json.contains("token_hash"));
        assert!(json.contains("me@here.com"));
    }
}
