use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::info;

use super::{
    dto::UpdateProfileRequest,
    repo_types::{MediaKind, User},
    validation::normalize_links,
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const USER_NOT_FOUND: &str = "User not found";
pub const BEGINNER_MESSAGE: &str = "Profile updated as beginner level";
pub const PROFILE_UPDATED: &str = "Profile updated successfully";

pub async fn load_profile(state: &AppState, email: &str) -> AppResult<User> {
    state
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
}

/// Either opt into the beginner path or replace the social links.
/// Nothing is written when validation fails.
pub async fn update_profile(
    state: &AppState,
    email: &str,
    req: UpdateProfileRequest,
) -> AppResult<(User, &'static str)> {
    if req.skip_github == Some(true) {
        let user = state
            .users
            .mark_beginner(email)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;
        info!(%email, "profile completed on beginner path");
        return Ok((user, BEGINNER_MESSAGE));
    }

    let links = normalize_links(req.social_links.unwrap_or_default())?;
    let user = state
        .users
        .update_social_links(email, &links)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;
    info!(%email, "social links updated");
    Ok((user, PROFILE_UPDATED))
}

/// Store a recording at its deterministic key and record it on the user.
/// An object written before a failed database update stays in place.
pub async fn upload_media(
    state: &AppState,
    email: &str,
    kind: MediaKind,
    body: Bytes,
) -> AppResult<(String, User)> {
    let key = kind.object_key(email);
    let size = body.len();
    state
        .storage
        .put_object(&key, body, kind.content_type())
        .await
        .with_context(|| format!("put_object {key}"))?;

    let url = state.storage.object_url(&key);
    info!(%email, media = kind.as_str(), size, %url, "media stored");

    let user = state
        .users
        .record_media(email, kind, &key, &url, OffsetDateTime::now_utc())
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

    Ok((url, user))
}
