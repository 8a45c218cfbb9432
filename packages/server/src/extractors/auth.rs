use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::hash;

/// Authenticated caller, resolved by the configured [`Authenticator`](crate::auth::Authenticator).
///
/// Add this as a handler parameter to require authentication.
pub struct AuthUser {
    pub email: String,
    /// Hashed email; fragments are stored under this id.
    pub owner_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let email = state.auth.authenticate(&parts.headers).await?;
        Ok(AuthUser {
            owner_id: hash::owner_id(&email),
            email,
        })
    }
}
