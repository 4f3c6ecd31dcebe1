use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Custom endpoint for S3-compatible stores (MinIO, localstack).
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub tokeninfo_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub admin_password: String,
    pub s3: S3Config,
    pub google: GoogleConfig,
    pub mail: MailConfig,
    pub secure_cookies: bool,
    pub max_upload_mb: usize,
}

pub const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = require_env("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: require_env("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "intake".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "intake-users".into()),
            ttl_minutes: parse_env("SESSION_TTL_MINUTES", 7 * 24 * 60),
        };
        let s3 = S3Config {
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".into()),
            bucket: require_env("S3_BUCKET_NAME")?,
            access_key: require_env("AWS_ACCESS_KEY_ID")?,
            secret_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            endpoint: optional_env("S3_ENDPOINT"),
        };
        let google = GoogleConfig {
            client_id: optional_env("GOOGLE_CLIENT_ID"),
            tokeninfo_url: std::env::var("GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|_| DEFAULT_TOKENINFO_URL.into()),
        };
        let mail = MailConfig {
            api_url: std::env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com/emails".into()),
            api_key: std::env::var("MAIL_API_KEY").unwrap_or_default(),
            from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Intake Team <no-reply@intake.local>".into()),
        };
        if mail.api_key.is_empty() {
            tracing::warn!("MAIL_API_KEY is not set; assessment emails will be rejected by the provider");
        }

        Ok(Self {
            database_url,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10),
            jwt,
            admin_password: require_env("ADMIN_PASSWORD")?,
            s3,
            google,
            mail,
            secure_cookies: std::env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
            max_upload_mb: parse_env("MAX_UPLOAD_MB", 100),
        })
    }
}

fn require_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
