use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{instrument, warn};

use crate::auth::dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::auth::extractors::CurrentUser;
use crate::auth::services;
use crate::auth::AuthUser;
use crate::error::AuthError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<StatusCode, AuthError> {
    // Emails are stored case-sensitively as given, only surrounding
    // whitespace is dropped.
    payload.email = payload.email.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!("register with invalid email shape");
        return Err(AuthError::Validation("Invalid email"));
    }
    if payload.password.len() < 8 {
        warn!("register with too short password");
        return Err(AuthError::Validation("Password too short"));
    }

    services::register_user(&state, &payload.email, &payload.password).await?;
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    payload.email = payload.email.trim().to_string();
    let access_token = services::login_user(&state, &payload.email, &payload.password).await?;
    Ok(Json(LoginResponse { access_token }))
}

/// The gate already resolved the identity; this just echoes it back.
#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<AuthUser> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("@x.com"));
    }
}
