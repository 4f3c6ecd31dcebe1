use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{AssessmentPatch, MediaKind, NewLogin, SocialLinks, User, UserRow};
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub const EMAIL_TAKEN: &str = "Email is already linked to another Google account";

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::Database(e) => AppError::Database(e),
        }
    }
}

/// Admin listing filter. `search` is matched literally, case-insensitively,
/// against name and email.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Persistence for the `users` document. Each call is a single atomic
/// statement; there is no cross-call locking.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert on first sign-in, otherwise refresh name, picture and
    /// last-login. Returns the user and whether it was created.
    async fn upsert_login(&self, login: &NewLogin) -> RepoResult<(User, bool)>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;
    /// Replace all social links and mark the profile completed.
    async fn update_social_links(&self, email: &str, links: &SocialLinks) -> RepoResult<Option<User>>;
    /// Beginner path: no GitHub, profile completed.
    async fn mark_beginner(&self, email: &str) -> RepoResult<Option<User>>;
    async fn record_media(
        &self,
        email: &str,
        kind: MediaKind,
        key: &str,
        url: &str,
        at: OffsetDateTime,
    ) -> RepoResult<Option<User>>;
    /// Page of users ordered by creation time (newest first) plus total matches.
    async fn list(&self, query: &UserQuery) -> RepoResult<(Vec<User>, i64)>;
    async fn update_assessment(&self, id: Uuid, patch: &AssessmentPatch) -> RepoResult<Option<User>>;
    async fn mark_email_sent(&self, id: Uuid, at: OffsetDateTime) -> RepoResult<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    user: UserRow,
    inserted: bool,
}

/// Escape LIKE metacharacters so user input is matched literally.
pub fn like_pattern(search: &str) -> String {
    let mut out = String::with_capacity(search.len() + 2);
    out.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn upsert_login(&self, login: &NewLogin) -> RepoResult<(User, bool)> {
        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO users (google_id, email, name, picture)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (google_id) DO UPDATE
               SET name = EXCLUDED.name,
                   picture = EXCLUDED.picture,
                   last_login_at = now(),
                   updated_at = now()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(&login.google_id)
        .bind(&login.email)
        .bind(&login.name)
        .bind(&login.picture)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return RepoError::Conflict(EMAIL_TAKEN.into());
                }
            }
            RepoError::Database(e)
        })?;
        Ok((row.user.into(), row.inserted))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::from))
    }

    async fn update_social_links(&self, email: &str, links: &SocialLinks) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET github = $2, gitlab = $3, medium = $4, devto = $5,
                   twitter = $6, linkedin = $7, website = $8,
                   profile_completed = TRUE,
                   updated_at = now()
             WHERE email = $1
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(&links.github)
        .bind(&links.gitlab)
        .bind(&links.medium)
        .bind(&links.devto)
        .bind(&links.twitter)
        .bind(&links.linkedin)
        .bind(&links.website)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn mark_beginner(&self, email: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET is_beginner_level = TRUE,
                   skip_github = TRUE,
                   profile_completed = TRUE,
                   updated_at = now()
             WHERE email = $1
            RETURNING *
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn record_media(
        &self,
        email: &str,
        kind: MediaKind,
        key: &str,
        url: &str,
        at: OffsetDateTime,
    ) -> RepoResult<Option<User>> {
        let sql = match kind {
            MediaKind::Audio => {
                r#"
                UPDATE users
                   SET audio_key = $2, audio_url = $3, audio_recorded = TRUE,
                       audio_recorded_at = $4, updated_at = now()
                 WHERE email = $1
                RETURNING *
                "#
            }
            MediaKind::Video => {
                r#"
                UPDATE users
                   SET video_key = $2, video_url = $3, video_recorded = TRUE,
                       video_recorded_at = $4, updated_at = now()
                 WHERE email = $1
                RETURNING *
                "#
            }
        };
        let row = sqlx::query_as::<_, UserRow>(sql)
            .bind(email)
            .bind(key)
            .bind(url)
            .bind(at)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::from))
    }

    async fn list(&self, query: &UserQuery) -> RepoResult<(Vec<User>, i64)> {
        let pattern = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
              FROM users
             WHERE $1::text IS NULL
                OR name ILIKE $1 ESCAPE '\'
                OR email ILIKE $1 ESCAPE '\'
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT *
              FROM users
             WHERE $1::text IS NULL
                OR name ILIKE $1 ESCAPE '\'
                OR email ILIKE $1 ESCAPE '\'
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.db)
        .await?;

        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    async fn update_assessment(&self, id: Uuid, patch: &AssessmentPatch) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET hireable_status = COALESCE($2, hireable_status),
                   strengths = COALESCE($3, strengths),
                   weaknesses = COALESCE($4, weaknesses),
                   updated_at = now()
             WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.hireable_status.map(|s| s.as_str()))
        .bind(&patch.strengths)
        .bind(&patch.weaknesses)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn mark_email_sent(&self, id: Uuid, at: OffsetDateTime) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET email_sent = TRUE, email_sent_at = $2, updated_at = now()
             WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }
}
