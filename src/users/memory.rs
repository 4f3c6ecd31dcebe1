//! In-process `UserRepo` used by router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::repo::{RepoError, RepoResult, UserQuery, UserRepo, EMAIL_TAKEN};
use super::repo_types::{
    AssessmentPatch, HireableStatus, MediaKind, MediaRecord, NewLogin, SocialLinks, User,
};

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepo {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Panics if absent; tests only call it for users they created.
    pub fn find_by_email_sync(&self, email: &str) -> User {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.email == email).cloned().unwrap()
    }

    /// Seed a user directly, bypassing sign-in.
    pub fn insert(&self, google_id: &str, email: &str, name: &str) -> User {
        let mut users = self.users.lock().unwrap();
        let user = new_user(google_id, email, name, None, next_created_at(&users));
        users.push(user.clone());
        user
    }

    fn update<F>(&self, pred: impl Fn(&User) -> bool, f: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| pred(u))?;
        f(user);
        user.updated_at = OffsetDateTime::now_utc();
        Some(user.clone())
    }
}

fn next_created_at(users: &[User]) -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    match users.iter().map(|u| u.created_at).max() {
        Some(last) if last >= now => last + Duration::microseconds(1),
        _ => now,
    }
}

fn new_user(
    google_id: &str,
    email: &str,
    name: &str,
    picture: Option<String>,
    created_at: OffsetDateTime,
) -> User {
    User {
        id: Uuid::new_v4(),
        google_id: google_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        picture,
        social_links: SocialLinks::default(),
        profile_completed: false,
        is_beginner_level: false,
        skip_github: false,
        audio: MediaRecord::default(),
        video: MediaRecord::default(),
        hireable_status: HireableStatus::NotAssessed,
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        email_sent: false,
        email_sent_at: None,
        created_at,
        updated_at: created_at,
        last_login_at: created_at,
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn upsert_login(&self, login: &NewLogin) -> RepoResult<(User, bool)> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.google_id == login.google_id) {
            existing.name = login.name.clone();
            existing.picture = login.picture.clone();
            existing.last_login_at = OffsetDateTime::now_utc();
            existing.updated_at = existing.last_login_at;
            return Ok((existing.clone(), false));
        }
        if users.iter().any(|u| u.email == login.email) {
            return Err(RepoError::Conflict(EMAIL_TAKEN.into()));
        }
        let user = new_user(
            &login.google_id,
            &login.email,
            &login.name,
            login.picture.clone(),
            next_created_at(&users),
        );
        users.push(user.clone());
        Ok((user, true))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_social_links(&self, email: &str, links: &SocialLinks) -> RepoResult<Option<User>> {
        Ok(self.update(
            |u| u.email == email,
            |u| {
                u.social_links = links.clone();
                u.profile_completed = true;
            },
        ))
    }

    async fn mark_beginner(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.update(
            |u| u.email == email,
            |u| {
                u.is_beginner_level = true;
                u.skip_github = true;
                u.profile_completed = true;
            },
        ))
    }

    async fn record_media(
        &self,
        email: &str,
        kind: MediaKind,
        key: &str,
        url: &str,
        at: OffsetDateTime,
    ) -> RepoResult<Option<User>> {
        Ok(self.update(
            |u| u.email == email,
            |u| {
                *u.media_mut(kind) = MediaRecord {
                    key: Some(key.to_string()),
                    url: Some(url.to_string()),
                    recorded: true,
                    recorded_at: Some(at),
                };
            },
        ))
    }

    async fn list(&self, query: &UserQuery) -> RepoResult<(Vec<User>, i64)> {
        let users = self.users.lock().unwrap();
        let needle = query.search.as_deref().unwrap_or("").to_lowercase();
        let mut matched: Vec<User> = users
            .iter()
            .filter(|u| {
                needle.is_empty()
                    || u.name.to_lowercase().contains(&needle)
                    || u.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_assessment(&self, id: Uuid, patch: &AssessmentPatch) -> RepoResult<Option<User>> {
        Ok(self.update(
            |u| u.id == id,
            |u| {
                if let Some(status) = patch.hireable_status {
                    u.hireable_status = status;
                }
                if let Some(strengths) = &patch.strengths {
                    u.strengths = strengths.clone();
                }
                if let Some(weaknesses) = &patch.weaknesses {
                    u.weaknesses = weaknesses.clone();
                }
            },
        ))
    }

    async fn mark_email_sent(&self, id: Uuid, at: OffsetDateTime) -> RepoResult<Option<User>> {
        Ok(self.update(
            |u| u.id == id,
            |u| {
                u.email_sent = true;
                u.email_sent_at = Some(at);
            },
        ))
    }
}
