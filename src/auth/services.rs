use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::claims::SessionIdentity;
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::repo_types::NewLogin,
};

pub const INVALID_TOKEN: &str = "Invalid token";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Verify a Google credential and create or refresh the matching user.
pub async fn sign_in_with_google(
    state: &AppState,
    credential: &str,
) -> AppResult<SessionIdentity> {
    let identity = state
        .google
        .verify(credential)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;

    if !is_valid_email(&identity.email) {
        warn!(sub = %identity.sub, "google identity without usable email");
        return Err(AppError::unauthorized(INVALID_TOKEN));
    }

    let login = NewLogin {
        google_id: identity.sub.clone(),
        email: identity.email.clone(),
        name: identity.name.clone(),
        picture: identity.picture.clone(),
    };
    let (user, created) = state.users.upsert_login(&login).await?;
    info!(user_id = %user.id, email = %user.email, created, "google sign-in");

    Ok(SessionIdentity {
        id: user.google_id,
        email: user.email,
        name: user.name,
        picture: user.picture,
    })
}
