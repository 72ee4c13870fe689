use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::repo_types::{AuthUser, Token, User};
use crate::error::StoreError;

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

impl User {
    /// Absence is a `None`, not an error.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, hashed_password, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Duplicate detection comes from the unique constraint, not a pre-check,
    /// so two concurrent inserts of the same email cannot both succeed.
    pub async fn insert(
        db: &PgPool,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, hashed_password)
            VALUES ($1, $2)
            RETURNING user_id, email, hashed_password, created_at
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail
            } else {
                e.into()
            }
        })
    }

    pub async fn update_password(
        db: &PgPool,
        user_id: i64,
        hashed_password: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET hashed_password = $2
            WHERE user_id = $1
            RETURNING user_id, email, hashed_password, created_at
            "#,
        )
        .bind(user_id)
        .bind(hashed_password)
        .fetch_optional(db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Resolve the identity a token stands for. `NotFound` here means the
    /// user row vanished out from under a live token; the gate logs it and
    /// answers 401.
    pub async fn auth_user_for_token(db: &PgPool, token: &Token) -> Result<AuthUser, StoreError> {
        sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT user_id, email, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(token.user_id)
        .fetch_optional(db)
        .await?
        .ok_or(StoreError::NotFound)
    }
}

impl Token {
    /// `created_at` is assigned by the store.
    pub async fn insert(
        db: &PgPool,
        value: &str,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> Result<Token, StoreError> {
        sqlx::query_as::<_, Token>(
            r#"
            INSERT INTO tokens (value, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token_id, value, user_id, active, expires_at, created_at, deactivated_at
            "#,
        )
        .bind(value)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateValue
            } else if is_foreign_key_violation(&e) {
                StoreError::ForeignKeyViolation
            } else {
                e.into()
            }
        })
    }

    /// Only filters the explicit `active` flag; expiry against the clock is
    /// the gate's responsibility.
    pub async fn find_active_by_value(
        db: &PgPool,
        value: &str,
    ) -> Result<Option<Token>, StoreError> {
        let token = sqlx::query_as::<_, Token>(
            r#"
            SELECT token_id, value, user_id, active, expires_at, created_at, deactivated_at
            FROM tokens
            WHERE value = $1 AND active = TRUE
            "#,
        )
        .bind(value)
        .fetch_optional(db)
        .await?;
        Ok(token)
    }

    /// Compare-and-set: only flips a still-active token. Returns whether this
    /// call performed the deactivation; `false` means another request got
    /// there first, which callers treat as the same terminal state.
    pub async fn deactivate(db: &PgPool, token_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tokens
            SET active = FALSE, deactivated_at = now()
            WHERE token_id = $1 AND active = TRUE
            "#,
        )
        .bind(token_id)
        .execute(db)
        .await?;
        let deactivated = result.rows_affected() > 0;
        debug!(token_id, deactivated, "token deactivation");
        Ok(deactivated)
    }
}
