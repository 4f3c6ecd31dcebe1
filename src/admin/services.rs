use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::dto::{ListParams, Pagination, UpdateUserRequest, UserListResponse};
use crate::{
    error::{AppError, AppResult},
    mail::send_assessment_email,
    state::AppState,
    storage::{key_from_url, PRESIGN_TTL_SECS},
    users::{
        dto::UserView,
        repo::UserQuery,
        repo_types::{AssessmentPatch, HireableStatus, MediaKind, User},
        services::USER_NOT_FOUND,
    },
};

pub const EMAIL_FAILED: &str = "Failed to send email";
pub const EMAIL_SENT: &str = "Assessment email sent successfully";

pub fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    raw.parse()
        .map_err(|_| AppError::bad_request(format!("Invalid user id '{raw}'")))
}

/// View of `user` whose media URLs are freshly presigned. A presign failure
/// keeps the stored URL for that object.
pub async fn with_presigned_media(state: &AppState, user: User) -> UserView {
    let mut targets = Vec::with_capacity(2);
    for kind in [MediaKind::Audio, MediaKind::Video] {
        let media = user.media(kind);
        let key = match (&media.key, &media.url) {
            (Some(key), _) => key.clone(),
            (None, Some(url)) => key_from_url(&state.config.s3.bucket, url).to_string(),
            (None, None) => continue,
        };
        targets.push((kind, key));
    }

    let email = user.email.clone();
    let mut view = UserView::from(user);
    for (kind, key) in targets {
        match state.storage.presign_get(&key, PRESIGN_TTL_SECS).await {
            Ok(url) => view.set_media_url(kind, url),
            Err(e) => warn!(%email, %key, error = %e, "presign failed; returning stored url"),
        }
    }
    view
}

pub async fn list_users(state: &AppState, params: &ListParams) -> AppResult<UserListResponse> {
    let page = params.page();
    let limit = params.limit();
    let query = UserQuery {
        search: params.search(),
        limit,
        offset: (page - 1).saturating_mul(limit),
    };

    let (users, total) = state.users.list(&query).await?;

    let mut views = Vec::with_capacity(users.len());
    for user in users {
        views.push(with_presigned_media(state, user).await);
    }

    Ok(UserListResponse {
        success: true,
        users: views,
        pagination: Pagination::new(page, limit, total),
    })
}

pub async fn get_user(state: &AppState, id: Uuid) -> AppResult<User> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
}

/// Overwrite whichever assessment fields were supplied. The status is
/// checked before anything is written.
pub async fn update_user(state: &AppState, id: Uuid, req: UpdateUserRequest) -> AppResult<User> {
    let hireable_status = req
        .hireable_status
        .map(|s| s.parse::<HireableStatus>())
        .transpose()
        .map_err(|e| AppError::bad_request(format!("Invalid hireableStatus: {}", e.0)))?;

    let patch = AssessmentPatch {
        hireable_status,
        strengths: req.strengths,
        weaknesses: req.weaknesses,
    };
    if patch.is_empty() {
        return get_user(state, id).await;
    }

    let user = state
        .users
        .update_assessment(id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;
    info!(user_id = %id, status = %user.hireable_status, "assessment updated");
    Ok(user)
}

/// Email the stored assessment and record that it went out. Flags stay
/// untouched when the provider refuses the message.
pub async fn send_assessment(state: &AppState, id: Uuid) -> AppResult<User> {
    let user = get_user(state, id).await?;

    send_assessment_email(
        state.mailer.as_ref(),
        &user.email,
        &user.name,
        user.hireable_status,
        &user.strengths,
        &user.weaknesses,
    )
    .await
    .map_err(|e| {
        error!(user_id = %id, error = %e, "assessment email failed");
        AppError::BadGateway(EMAIL_FAILED.into())
    })?;

    state
        .users
        .mark_email_sent(id, OffsetDateTime::now_utc())
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
}
