use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{HireableStatus, MediaKind, SocialLinks, User};

/// JSON shape of a user, shared by the profile and admin endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub social_links: SocialLinks,
    pub profile_completed: bool,
    pub is_beginner_level: bool,
    pub skip_github: bool,
    pub audio_url: Option<String>,
    pub audio_recorded: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub audio_recorded_at: Option<OffsetDateTime>,
    pub video_url: Option<String>,
    pub video_recorded: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub video_recorded_at: Option<OffsetDateTime>,
    pub hireable_status: HireableStatus,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub email_sent: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub email_sent_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_login_at: OffsetDateTime,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            google_id: u.google_id,
            email: u.email,
            name: u.name,
            picture: u.picture,
            social_links: u.social_links,
            profile_completed: u.profile_completed,
            is_beginner_level: u.is_beginner_level,
            skip_github: u.skip_github,
            audio_url: u.audio.url,
            audio_recorded: u.audio.recorded,
            audio_recorded_at: u.audio.recorded_at,
            video_url: u.video.url,
            video_recorded: u.video.recorded,
            video_recorded_at: u.video.recorded_at,
            hireable_status: u.hireable_status,
            strengths: u.strengths,
            weaknesses: u.weaknesses,
            email_sent: u.email_sent,
            email_sent_at: u.email_sent_at,
            created_at: u.created_at,
            updated_at: u.updated_at,
            last_login_at: u.last_login_at,
        }
    }
}

impl UserView {
    pub fn set_media_url(&mut self, kind: MediaKind, url: String) {
        match kind {
            MediaKind::Audio => self.audio_url = Some(url),
            MediaKind::Video => self.video_url = Some(url),
        }
    }
}

/// Body of `PUT /api/user/profile`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub social_links: Option<SocialLinks>,
    #[serde(default)]
    pub skip_github: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: UserView,
}

/// Upload result; the URL is keyed `audioUrl` or `videoUrl` by media kind.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(rename = "audioUrl", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(rename = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub user: UserView,
}

impl UploadResponse {
    pub fn new(kind: MediaKind, url: String, user: User) -> Self {
        let (audio_url, video_url, message) = match kind {
            MediaKind::Audio => (Some(url), None, "Audio uploaded successfully"),
            MediaKind::Video => (None, Some(url), "Video uploaded successfully"),
        };
        Self {
            success: true,
            message,
            audio_url,
            video_url,
            user: user.into(),
        }
    }
}
