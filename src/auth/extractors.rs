use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{
    claims::SessionIdentity,
    cookies::{read_cookie, SESSION_COOKIE},
    jwt::SessionKeys,
};
use crate::error::AppError;

pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Signed-in candidate, taken from the `session` cookie.
pub struct SessionUser(pub SessionIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = read_cookie(&parts.headers, SESSION_COOKIE)
            .ok_or_else(|| AppError::unauthorized(NOT_AUTHENTICATED))?;

        let keys = SessionKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired session");
            AppError::unauthorized(NOT_AUTHENTICATED)
        })?;

        Ok(SessionUser(claims.user))
    }
}
