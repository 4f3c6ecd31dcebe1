use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    cookies::{clear_cookie, set_cookie, SESSION_COOKIE},
    dto::{AuthResponse, GoogleLoginRequest, LogoutResponse, SessionResponse},
    extractors::SessionUser,
    services::sign_in_with_google,
};
use crate::{
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/google", post(google_login))
        .route("/api/auth/session", get(get_session))
        .route("/api/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn google_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<GoogleLoginRequest>,
) -> AppResult<impl IntoResponse> {
    let credential = payload
        .credential
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing credential"))?;

    let user = sign_in_with_google(&state, &credential).await?;

    let token = state.keys.sign(&user)?;
    let cookie = set_cookie(
        SESSION_COOKIE,
        &token,
        state.keys.ttl_secs(),
        state.config.secure_cookies,
    )?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            user,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn get_session(SessionUser(user): SessionUser) -> Json<SessionResponse> {
    Json(SessionResponse { user })
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cookie = clear_cookie(SESSION_COOKIE, state.config.secure_cookies)?;
    Ok(([(SET_COOKIE, cookie)], Json(LogoutResponse { success: true })))
}
