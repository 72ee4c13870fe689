use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record as stored. The hash never leaves the auth module in JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: OffsetDateTime,
}

/// The public subset of a user, resolved by the authorization gate from a
/// presented token. Handlers receive this, never a raw token or a full `User`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub created_at: OffsetDateTime,
}

/// Opaque access token record. `active = true` implies `deactivated_at` is
/// null; deactivation is terminal, there is no reactivation path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Token {
    pub token_id: i64,
    pub value: String,
    pub user_id: i64,
    pub active: bool,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub deactivated_at: Option<OffsetDateTime>,
}

impl Token {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn token_expiring_at(expires_at: OffsetDateTime) -> Token {
        Token {
            token_id: 1,
            value: "x".repeat(32),
            user_id: 1,
            active: true,
            expires_at,
            created_at: expires_at - Duration::minutes(5),
            deactivated_at: None,
        }
    }

    #[test]
    fn token_in_the_past_is_expired() {
        let now = OffsetDateTime::now_utc();
        let token = token_expiring_at(now - Duration::seconds(1));
        assert!(token.is_expired(now));
    }

    #[test]
    fn token_at_or_after_now_is_not_expired() {
        let now = OffsetDateTime::now_utc();
        assert!(!token_expiring_at(now).is_expired(now));
        assert!(!token_expiring_at(now + Duration::minutes(5)).is_expired(now));
    }
}
