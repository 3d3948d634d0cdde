//! Caller identity.
//!
//! Sessions are verified by the upstream authentication proxy, which
//! forwards the user ID in a header (`x-user-id` unless configured
//! otherwise). The extractor only checks that the ID names a known user.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use babylink_core::{Error, UserRecord};

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(&state.config.identity_header)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::Unauthorized)?;

        let user = state.chat.authenticate(user_id.trim())?;
        Ok(CurrentUser(user))
    }
}
