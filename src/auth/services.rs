use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::dto::{AuthResponse, Flash, FlashKind, LoginRequest};
use crate::auth::jwt::JwtKeys;
use crate::state::AppState;
use crate::users::password::verify_absent_user;
use crate::users::User;

/// Shown for every failed login, whatever the cause.
pub const INCORRECT_CREDENTIALS: &str = "Incorrect Credentials.";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email, wrong password and backend failures all land here so
    /// callers cannot tell them apart.
    #[error("Incorrect Credentials.")]
    IncorrectCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
}

/// Check credentials and issue a session token.
#[instrument(skip(state, credentials))]
pub async fn login(
    state: &AppState,
    credentials: LoginRequest,
) -> Result<AuthResponse, AuthError> {
    let user = match User::find_by_email(state.store.as_ref(), &credentials.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            verify_absent_user(&credentials.password);
            warn!("login unknown email");
            return Err(AuthError::IncorrectCredentials);
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(AuthError::IncorrectCredentials);
        }
    };

    if !user.validate_password(&credentials.password) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::IncorrectCredentials);
    }

    let token = JwtKeys::from(&state.config.jwt).sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AuthError::IncorrectCredentials
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(AuthResponse { token, user })
}

/// Resolve a session token to the user id it was issued for.
pub fn authenticate(state: &AppState, token: &str) -> Result<Uuid, AuthError> {
    JwtKeys::from(&state.config.jwt)
        .verify(token)
        .map(|claims| claims.sub)
        .map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AuthError::InvalidToken
        })
}

/// The notice the login form shows for a given outcome.
pub fn login_flash(outcome: &Result<AuthResponse, AuthError>) -> Flash {
    match outcome {
        Ok(res) => Flash {
            kind: FlashKind::Success,
            content: format!("You have successfully logged in, {}!", res.user.first_name),
        },
        Err(_) => Flash {
            kind: FlashKind::Warning,
            content: INCORRECT_CREDENTIALS.to_string(),
        },
    }
}
