use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::{debug, warn};

use super::repo::User;
use crate::{error::ApiError, state::AppState};

/// The authenticated user behind a request's bearer token.
///
/// Every way of failing (no header, wrong scheme, bad or expired token,
/// subject with no matching user) rejects with the same
/// [`ApiError::InvalidToken`].
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            debug!("missing or malformed Authorization header");
            ApiError::InvalidToken
        })?;

        let claims = state.keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::InvalidToken
        })?;

        let user = User::find_by_email(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| {
                warn!("token subject does not resolve to a user");
                ApiError::InvalidToken
            })?;

        Ok(CurrentUser(user))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
