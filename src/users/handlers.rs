use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{instrument, warn};

use super::{
    dto::{ProfileResponse, ProfileUpdatedResponse, UpdateProfileRequest, UploadResponse},
    repo_types::MediaKind,
    services::{load_profile, update_profile, upload_media},
};
use crate::{
    auth::extractors::SessionUser,
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/api/user/profile", get(get_profile).put(put_profile))
}

pub fn upload_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/user/audio/upload", post(upload_audio))
        .route("/api/user/video/upload", post(upload_video))
        .layer(DefaultBodyLimit::max(max_bytes))
}

#[instrument(skip_all, fields(email = %user.email))]
pub async fn get_profile(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = load_profile(&state, &user.email).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user: user.into(),
    }))
}

#[instrument(skip_all, fields(email = %user.email))]
pub async fn put_profile(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    AppJson(body): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<ProfileUpdatedResponse>> {
    let (user, message) = update_profile(&state, &user.email, body).await?;
    Ok(Json(ProfileUpdatedResponse {
        success: true,
        message,
        user: user.into(),
    }))
}

#[instrument(skip_all, fields(email = %user.email))]
pub async fn upload_audio(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    mp: Multipart,
) -> AppResult<Json<UploadResponse>> {
    upload(&state, &user.email, MediaKind::Audio, mp).await
}

#[instrument(skip_all, fields(email = %user.email))]
pub async fn upload_video(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    mp: Multipart,
) -> AppResult<Json<UploadResponse>> {
    upload(&state, &user.email, MediaKind::Video, mp).await
}

async fn upload(
    state: &AppState,
    email: &str,
    kind: MediaKind,
    mut mp: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let body = read_field(&mut mp, kind.as_str())
        .await?
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::bad_request(format!("No {} file provided", kind.as_str())))?;

    let (url, user) = upload_media(state, email, kind, body).await?;
    Ok(Json(UploadResponse::new(kind, url, user)))
}

/// Bytes of the first part named `name`; other parts are skipped.
async fn read_field(mp: &mut Multipart, name: &str) -> AppResult<Option<Bytes>> {
    while let Some(field) = mp.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(name) {
            return Ok(Some(field.bytes().await.map_err(multipart_error)?));
        }
    }
    Ok(None)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    warn!(error = %e, "unreadable multipart body");
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(e.body_text());
    }
    AppError::bad_request(e.body_text())
}
