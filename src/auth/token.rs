use data_encoding::BASE32_NOPAD;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::errors::AuthError;

/// 16 CSPRNG bytes in unpadded base-32: every issued token is exactly this
/// long, and the authorizer rejects anything that is not before touching
/// the store.
pub const TOKEN_LENGTH: usize = 26;

const TOKEN_BYTES: usize = 16;

/// A freshly minted token. The plaintext leaves the process exactly once,
/// in the login response; only the digest is ever written to the store.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub user_id: i64,
    pub plaintext: String,
    pub digest: Vec<u8>,
    pub expiry: OffsetDateTime,
}

pub fn issue(user_id: i64, ttl: Duration) -> Result<IssuedToken, AuthError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::RandomSource(e.to_string()))?;
    let plaintext = BASE32_NOPAD.encode(&bytes);
    let digest = digest(&plaintext);
    Ok(IssuedToken {
        user_id,
        plaintext,
        digest,
        expiry: OffsetDateTime::now_utc() + ttl,
    })
}

/// SHA-256 of the textual token, the only queryable form at rest.
pub fn digest(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_has_fixed_length_and_charset() {
        let token = issue(1, Duration::hours(24)).expect("issue");
        assert_eq!(token.plaintext.len(), TOKEN_LENGTH);
        assert!(token
            .plaintext
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
    }

    #[test]
    fn digest_is_sha256_of_the_textual_form() {
        let token = issue(1, Duration::hours(1)).expect("issue");
        assert_eq!(token.digest, digest(&token.plaintext));
        assert_eq!(token.digest.len(), 32);
    }

    #[test]
    fn expiry_lands_ttl_from_now() {
        let before = OffsetDateTime::now_utc();
        let token = issue(1, Duration::hours(24)).expect("issue");
        let after = OffsetDateTime::now_utc();
        assert!(token.expiry >= before + Duration::hours(24));
        assert!(token.expiry <= after + Duration::hours(24));
    }

    #[test]
    fn consecutive_tokens_differ() {
        let a = issue(7, Duration::hours(1)).expect("issue");
        let b = issue(7, Duration::hours(1)).expect("issue");
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.digest, b.digest);
    }
}
