use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::auth::repo_types::Token;
use crate::error::StoreError;

/// Draws `length` characters from the 62-character alphanumeric alphabet
/// using the OS entropy source.
pub fn generate_value(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Issue one access token for `user_id`. Uniqueness of the value is enforced
/// by the store; a collision at this length is astronomically unlikely, so a
/// single regeneration retry is enough and a second collision propagates.
pub async fn issue(
    db: &PgPool,
    user_id: i64,
    ttl: Duration,
    length: usize,
) -> Result<Token, StoreError> {
    let expires_at = OffsetDateTime::now_utc() + ttl;
    match Token::insert(db, &generate_value(length), user_id, expires_at).await {
        Err(StoreError::DuplicateValue) => {
            warn!(user_id, "token value collision, regenerating once");
            Token::insert(db, &generate_value(length), user_id, expires_at).await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_value_has_requested_length() {
        assert_eq!(generate_value(32).len(), 32);
        assert_eq!(generate_value(64).len(), 64);
    }

    #[test]
    fn generated_value_is_alphanumeric() {
        let value = generate_value(256);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn consecutive_values_differ() {
        assert_ne!(generate_value(32), generate_value(32));
    }
}
