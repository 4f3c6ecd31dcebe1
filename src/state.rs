use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::{google::GoogleVerifier, google::TokenInfoVerifier, jwt::SessionKeys};
use crate::config::AppConfig;
use crate::mail::{HttpMailer, Mailer};
use crate::storage::{Storage, StorageClient};
use crate::users::repo::{PgUserRepo, UserRepo};

/// Handles to every collaborator, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: SessionKeys,
    pub users: Arc<dyn UserRepo>,
    pub storage: Arc<dyn StorageClient>,
    pub google: Arc<dyn GoogleVerifier>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        run_migrations(&db).await?;

        let storage = Arc::new(Storage::new(&config.s3).await?) as Arc<dyn StorageClient>;
        let google = Arc::new(TokenInfoVerifier::new(&config.google)?) as Arc<dyn GoogleVerifier>;
        let mailer = Arc::new(HttpMailer::new(&config.mail)?) as Arc<dyn Mailer>;

        Ok(Self {
            keys: SessionKeys::new(&config.jwt),
            users: Arc::new(PgUserRepo::new(db)),
            config,
            storage,
            google,
            mailer,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        storage: Arc<dyn StorageClient>,
        google: Arc<dyn GoogleVerifier>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            keys: SessionKeys::new(&config.jwt),
            config,
            users,
            storage,
            google,
            mailer,
        }
    }
}

pub async fn run_migrations(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")
}
