use axum::{
    extract::{Path, State},
    http::header::SET_COOKIE,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    auth::{password_matches, AdminSession, ADMIN_COOKIE, ADMIN_COOKIE_VALUE, ADMIN_SESSION_SECS},
    dto::{
        AdminLoginRequest, EmailSentResponse, ListParams, MessageResponse, UpdateUserRequest,
        UserListResponse, UserResponse,
    },
    services::{
        get_user, list_users, parse_user_id, send_assessment, update_user, with_presigned_media,
        EMAIL_SENT,
    },
};
use crate::{
    auth::cookies::{clear_cookie, set_cookie},
    error::{AppError, AppResult},
    extract::{AppJson, AppQuery},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/auth", post(login))
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/users", get(list))
        .route("/api/admin/users/:id", get(show).patch(update))
        .route("/api/admin/users/:id/email", post(send_email))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AdminLoginRequest>,
) -> AppResult<impl IntoResponse> {
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::bad_request("Password is required"))?;

    if !password_matches(&state.config.admin_password, &password) {
        warn!("admin login rejected");
        return Err(AppError::unauthorized("Invalid password"));
    }

    let cookie = set_cookie(
        ADMIN_COOKIE,
        ADMIN_COOKIE_VALUE,
        ADMIN_SESSION_SECS,
        state.config.secure_cookies,
    )?;
    info!("admin signed in");
    Ok((
        [(SET_COOKIE, cookie)],
        Json(MessageResponse {
            success: true,
            message: "Admin authenticated successfully",
        }),
    ))
}

#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cookie = clear_cookie(ADMIN_COOKIE, state.config.secure_cookies)?;
    Ok((
        [(SET_COOKIE, cookie)],
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully",
        }),
    ))
}

#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<Json<UserListResponse>> {
    Ok(Json(list_users(&state, &params).await?))
}

#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = get_user(&state, parse_user_id(&id)?).await?;
    Ok(Json(UserResponse {
        success: true,
        user: with_presigned_media(&state, user).await,
    }))
}

#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = update_user(&state, parse_user_id(&id)?, body).await?;
    Ok(Json(UserResponse {
        success: true,
        user: user.into(),
    }))
}

#[instrument(skip(state, _admin))]
pub async fn send_email(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> AppResult<Json<EmailSentResponse>> {
    let user = send_assessment(&state, parse_user_id(&id)?).await?;
    Ok(Json(EmailSentResponse {
        success: true,
        message: EMAIL_SENT,
        user: user.into(),
    }))
}
