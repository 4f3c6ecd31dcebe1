use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Admin-assigned hireability label.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HireableStatus {
    Hireable,
    NearHireable,
    Unhireable,
    #[default]
    NotAssessed,
}

impl HireableStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HireableStatus::Hireable => "hireable",
            HireableStatus::NearHireable => "near_hireable",
            HireableStatus::Unhireable => "unhireable",
            HireableStatus::NotAssessed => "not_assessed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HireableStatus::Hireable => "Hireable",
            HireableStatus::NearHireable => "Near Hireable",
            HireableStatus::Unhireable => "Unhireable",
            HireableStatus::NotAssessed => "Not Assessed",
        }
    }
}

impl fmt::Display for HireableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown hireable status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for HireableStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hireable" => Ok(HireableStatus::Hireable),
            "near_hireable" => Ok(HireableStatus::NearHireable),
            "unhireable" => Ok(HireableStatus::Unhireable),
            "not_assessed" => Ok(HireableStatus::NotAssessed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLinks {
    pub github: Option<String>,
    pub gitlab: Option<String>,
    pub medium: Option<String>,
    pub devto: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
}

impl SocialLinks {
    /// Field name and value pairs, in display order.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("github", self.github.as_deref()),
            ("gitlab", self.gitlab.as_deref()),
            ("medium", self.medium.as_deref()),
            ("devto", self.devto.as_deref()),
            ("twitter", self.twitter.as_deref()),
            ("linkedin", self.linkedin.as_deref()),
            ("website", self.website.as_deref()),
        ]
    }
}

/// Submission artifact kind; each user has at most one object of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio/webm",
            MediaKind::Video => "video/mp4",
        }
    }

    /// Deterministic object key; a new upload overwrites the previous one.
    pub fn object_key(self, email: &str) -> String {
        match self {
            MediaKind::Audio => format!("{email}/audio.webm"),
            MediaKind::Video => format!("{email}/video.mp4"),
        }
    }
}

/// Identity fields supplied by Google on sign-in.
#[derive(Debug, Clone)]
pub struct NewLogin {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Fields an admin may overwrite. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct AssessmentPatch {
    pub hireable_status: Option<HireableStatus>,
    pub strengths: Option<Vec<String>>,
    pub weaknesses: Option<Vec<String>>,
}

impl AssessmentPatch {
    pub fn is_empty(&self) -> bool {
        self.hireable_status.is_none() && self.strengths.is_none() && self.weaknesses.is_none()
    }
}

/// Row shape of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub github: Option<String>,
    pub gitlab: Option<String>,
    pub medium: Option<String>,
    pub devto: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub profile_completed: bool,
    pub is_beginner_level: bool,
    pub skip_github: bool,
    pub audio_key: Option<String>,
    pub audio_url: Option<String>,
    pub audio_recorded: bool,
    pub audio_recorded_at: Option<OffsetDateTime>,
    pub video_key: Option<String>,
    pub video_url: Option<String>,
    pub video_recorded: bool,
    pub video_recorded_at: Option<OffsetDateTime>,
    pub hireable_status: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub email_sent: bool,
    pub email_sent_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub last_login_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaRecord {
    pub key: Option<String>,
    pub url: Option<String>,
    pub recorded: bool,
    pub recorded_at: Option<OffsetDateTime>,
}

/// Candidate document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub social_links: SocialLinks,
    pub profile_completed: bool,
    pub is_beginner_level: bool,
    pub skip_github: bool,
    pub audio: MediaRecord,
    pub video: MediaRecord,
    pub hireable_status: HireableStatus,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub email_sent: bool,
    pub email_sent_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub last_login_at: OffsetDateTime,
}

impl User {
    pub fn media(&self, kind: MediaKind) -> &MediaRecord {
        match kind {
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
        }
    }

    pub fn media_mut(&mut self, kind: MediaKind) -> &mut MediaRecord {
        match kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        }
    }
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        let hireable_status = r.hireable_status.parse().unwrap_or_else(|e: UnknownStatus| {
            tracing::warn!(user_id = %r.id, error = %e, "stored status not recognised");
            HireableStatus::NotAssessed
        });
        Self {
            id: r.id,
            google_id: r.google_id,
            email: r.email,
            name: r.name,
            picture: r.picture,
            social_links: SocialLinks {
                github: r.github,
                gitlab: r.gitlab,
                medium: r.medium,
                devto: r.devto,
                twitter: r.twitter,
                linkedin: r.linkedin,
                website: r.website,
            },
            profile_completed: r.profile_completed,
            is_beginner_level: r.is_beginner_level,
            skip_github: r.skip_github,
            audio: MediaRecord {
                key: r.audio_key,
                url: r.audio_url,
                recorded: r.audio_recorded,
                recorded_at: r.audio_recorded_at,
            },
            video: MediaRecord {
                key: r.video_key,
                url: r.video_url,
                recorded: r.video_recorded,
                recorded_at: r.video_recorded_at,
            },
            hireable_status,
            strengths: r.strengths,
            weaknesses: r.weaknesses,
            email_sent: r.email_sent,
            email_sent_at: r.email_sent_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
            last_login_at: r.last_login_at,
        }
    }
}
