use time::Duration;
use tracing::{info, warn};

use crate::auth::repo_types::User;
use crate::auth::token;
use crate::error::{AuthError, StoreError};
use crate::state::AppState;

pub async fn register_user(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    // Informational pre-check; the unique constraint on the insert is what
    // actually closes the race between two concurrent registrations.
    if User::find_by_email(&state.db, email).await?.is_some() {
        return Err(AuthError::UserAlreadyExists);
    }

    let hashed_password = state.passwords.hash(password)?;
    match User::insert(&state.db, email, &hashed_password).await {
        Ok(user) => {
            info!(user_id = user.user_id, "user registered");
            Ok(user)
        }
        Err(StoreError::DuplicateEmail) => Err(AuthError::UserAlreadyExists),
        Err(e) => Err(e.into()),
    }
}

/// An unknown email and a wrong password both answer `InvalidCredentials`;
/// the response never reveals which check failed.
pub async fn login_user(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<String, AuthError> {
    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    match state.passwords.verify(&user.hashed_password, password) {
        Ok(true) => {}
        Ok(false) | Err(_) => return Err(AuthError::InvalidCredentials),
    }

    if state.passwords.needs_rehash(&user.hashed_password) {
        rehash_password(state, &user, password).await;
    }

    let ttl = Duration::minutes(state.config.token.ttl_minutes);
    let token = token::issue(&state.db, user.user_id, ttl, state.config.token.length).await?;
    info!(user_id = user.user_id, "user logged in");
    Ok(token.value)
}

/// Best effort: a failure here keeps the old hash and never aborts the login.
async fn rehash_password(state: &AppState, user: &User, password: &str) {
    info!(user_id = user.user_id, "stored hash uses outdated parameters, rehashing");
    let new_hash = match state.passwords.hash(password) {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, user_id = user.user_id, "rehash failed, keeping old hash");
            return;
        }
    };
    if let Err(e) = User::update_password(&state.db, user.user_id, &new_hash).await {
        warn!(error = %e, user_id = user.user_id, "failed to persist rehashed password");
    }
}
