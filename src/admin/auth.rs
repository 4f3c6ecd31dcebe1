use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::{auth::cookies::read_cookie, error::AppError};

pub const ADMIN_COOKIE: &str = "admin_session";
pub const ADMIN_COOKIE_VALUE: &str = "authenticated";
pub const ADMIN_SESSION_SECS: i64 = 24 * 60 * 60;
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Constant-time comparison against the configured admin password.
pub fn password_matches(expected: &str, provided: &str) -> bool {
    bool::from(expected.as_bytes().ct_eq(provided.as_bytes()))
}

/// Marker extractor for requests carrying a valid admin cookie.
pub struct AdminSession;

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match read_cookie(&parts.headers, ADMIN_COOKIE) {
            Some(v) if v == ADMIN_COOKIE_VALUE => Ok(AdminSession),
            _ => {
                debug!("admin cookie missing or wrong");
                Err(AppError::unauthorized(UNAUTHORIZED))
            }
        }
    }
}
