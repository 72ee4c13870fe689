use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use time::OffsetDateTime;
use tracing::{error, warn};

use crate::auth::repo_types::{AuthUser, Token, User};
use crate::error::{AuthError, StoreError};
use crate::state::AppState;

/// The authorization gate. Resolves the bearer credential into an identity
/// before the handler runs; any failure short-circuits with a 401 and the
/// handler is never invoked.
pub struct CurrentUser(pub AuthUser);

/// The observed clients send the bare token value in `Authorization`; a
/// conventional `Bearer ` prefix is tolerated and stripped.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;
    Ok(raw.strip_prefix("Bearer ").unwrap_or(raw))
}

/// What the gate must do with the store's answer for a presented value.
#[derive(Debug)]
enum GateOutcome {
    Authorized(Token),
    /// Deactivate this token first, then reject with `CredentialExpired`.
    Expired(Token),
    /// No active token carries the value; deactivated tokens land here too,
    /// so a replayed expired value reads as invalid, not expired.
    Unknown,
}

fn evaluate_token(token: Option<Token>, now: OffsetDateTime) -> GateOutcome {
    match token {
        None => GateOutcome::Unknown,
        Some(t) if t.is_expired(now) => GateOutcome::Expired(t),
        Some(t) => GateOutcome::Authorized(t),
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let value = bearer_token(&parts.headers)?;

        let found = Token::find_active_by_value(&state.db, value).await?;
        let token = match evaluate_token(found, OffsetDateTime::now_utc()) {
            GateOutcome::Unknown => return Err(AuthError::InvalidCredential),
            GateOutcome::Expired(token) => {
                // Deactivate before rejecting so a replay of the same value
                // sees an inactive token. Losing the race to a concurrent
                // request leaves the same terminal state and is not an error.
                if let Err(e) = Token::deactivate(&state.db, token.token_id).await {
                    error!(error = %e, token_id = token.token_id, "failed to deactivate expired token");
                }
                warn!(token_id = token.token_id, "expired token presented");
                return Err(AuthError::CredentialExpired);
            }
            GateOutcome::Authorized(token) => token,
        };

        match User::auth_user_for_token(&state.db, &token).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(StoreError::NotFound) => {
                // Consistency fault: the user row vanished under a live token.
                error!(
                    token_id = token.token_id,
                    user_id = token.user_id,
                    "active token references a missing user"
                );
                Err(AuthError::InvalidCredential)
            }
            Err(e) => Err(e.into()),
        }
    }
}
