use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::config::GoogleConfig;

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[async_trait]
pub trait GoogleVerifier: Send + Sync {
    /// `Ok(None)` means Google rejected the credential.
    async fn verify(&self, credential: &str) -> anyhow::Result<Option<GoogleIdentity>>;
}

/// Payload of Google's token-info endpoint. Booleans arrive as strings.
#[derive(Debug, Deserialize)]
pub struct TokenInfo {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub aud: Option<String>,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub email_verified: bool,
}

fn bool_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Str(String),
    }
    Ok(match Flag::deserialize(d)? {
        Flag::Bool(b) => b,
        Flag::Str(s) => s.eq_ignore_ascii_case("true"),
    })
}

/// Apply acceptance rules to a token-info payload.
pub fn identity_from_tokeninfo(
    info: TokenInfo,
    expected_audience: Option<&str>,
) -> Option<GoogleIdentity> {
    if !info.email_verified {
        warn!(sub = %info.sub, "google email not verified");
        return None;
    }
    if let Some(expected) = expected_audience {
        if info.aud.as_deref() != Some(expected) {
            warn!(sub = %info.sub, aud = ?info.aud, "google token minted for another client");
            return None;
        }
    }
    let email = info.email?.trim().to_lowercase();
    let name = info
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
    Some(GoogleIdentity {
        sub: info.sub,
        email,
        name,
        picture: info.picture,
    })
}

/// Verifies credentials against Google's token-info endpoint.
#[derive(Clone)]
pub struct TokenInfoVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

impl TokenInfoVerifier {
    pub fn new(cfg: &GoogleConfig) -> anyhow::Result<Self> {
        if cfg.client_id.is_none() {
            warn!("GOOGLE_CLIENT_ID is not set; token audience will not be checked");
        }
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .context("build google http client")?;
        Ok(Self {
            client,
            tokeninfo_url: cfg.tokeninfo_url.clone(),
            client_id: cfg.client_id.clone(),
        })
    }
}

#[async_trait]
impl GoogleVerifier for TokenInfoVerifier {
    async fn verify(&self, credential: &str) -> anyhow::Result<Option<GoogleIdentity>> {
        let res = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", credential)])
            .send()
            .await
            .context("google tokeninfo request")?;

        if !res.status().is_success() {
            debug!(status = %res.status(), "google rejected credential");
            return Ok(None);
        }

        let info: TokenInfo = res.json().await.context("decode google tokeninfo")?;
        Ok(identity_from_tokeninfo(info, self.client_id.as_deref()))
    }
}
