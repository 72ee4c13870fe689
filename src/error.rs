use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Constraint violations and lookup failures, translated at the repository
/// boundary. Raw `sqlx` errors never cross into the service or gate layer
/// except wrapped as `Database`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("token value already exists")]
    DuplicateValue,
    #[error("referenced user does not exist")]
    ForeignKeyViolation,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Domain errors for the auth core. Every variant maps to exactly one HTTP
/// status and a stable detail string; an unknown email and a wrong password
/// share a single variant so the responses cannot be told apart.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("User with the provided email already exists")]
    UserAlreadyExists,
    #[error("Missing authorization header")]
    MissingCredential,
    #[error("Invalid token")]
    InvalidCredential,
    #[error("Token expired")]
    CredentialExpired,
    #[error("{0}")]
    Validation(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingCredential
            | AuthError::InvalidCredential
            | AuthError::CredentialExpired => StatusCode::UNAUTHORIZED,
            AuthError::UserAlreadyExists => StatusCode::CONFLICT,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Store(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            return (status, Json(json!({ "detail": "Internal server error" }))).into_response();
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_failures_are_unauthorized() {
        assert_eq!(AuthError::MissingCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::CredentialExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn duplicate_registration_is_conflict() {
        assert_eq!(AuthError::UserAlreadyExists.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failures_are_server_errors() {
        let err = AuthError::Store(StoreError::NotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn server_error_body_does_not_leak_detail() {
        let err = AuthError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Internal server error");
    }

    #[tokio::test]
    async fn unauthorized_body_carries_stable_detail() {
        let res = AuthError::InvalidCredentials.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Incorrect email or password");
    }
}
