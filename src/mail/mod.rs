use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::users::repo_types::HireableStatus;

pub mod template;

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()>;
}

/// Transactional mail provider reached over HTTPS with a bearer key.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build mail http client")?;
        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            from: cfg.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from,
                to: [&email.to],
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await
            .context("mail provider request")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("mail provider returned {status}: {body}");
        }
        debug!(to = %email.to, "mail accepted by provider");
        Ok(())
    }
}

/// Render and send the assessment email for one candidate.
pub async fn send_assessment_email(
    mailer: &dyn Mailer,
    to: &str,
    user_name: &str,
    status: HireableStatus,
    strengths: &[String],
    weaknesses: &[String],
) -> anyhow::Result<()> {
    info!(%to, status = %status, "sending assessment email");
    let email = OutgoingEmail {
        to: to.to_string(),
        subject: template::subject(status),
        html: template::render_assessment(user_name, status, strengths, weaknesses),
    };
    mailer.send(&email).await
}
