use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, SessionIdentity};
use crate::{config::JwtConfig, state::AppState};

/// HS256 keys and policy for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl SessionKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.as_secs() as i64
    }

    pub fn sign(&self, identity: &SessionIdentity) -> anyhow::Result<String> {
        self.sign_at(identity, OffsetDateTime::now_utc())
    }

    /// Sign a token as if it had been issued at `issued_at`.
    pub fn sign_at(
        &self,
        identity: &SessionIdentity,
        issued_at: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = issued_at + TimeDuration::seconds(self.ttl_secs());
        let claims = Claims {
            sub: identity.id.clone(),
            user: identity.clone(),
            expires_at: (exp.unix_timestamp_nanos() / 1_000_000) as i64,
            iat: issued_at.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(sub = %identity.id, "session signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;

        let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        if now_ms > data.claims.expires_at {
            anyhow::bail!("session expired");
        }
        debug!(sub = %data.claims.sub, "session verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> SessionKeys {
        SessionKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 7 * 24 * 60,
        })
    }

    fn jane() -> SessionIdentity {
        SessionIdentity {
            id: "google-123".into(),
            email: "jane@example.com".into(),
            name: "Jane Doe".into(),
            picture: Some("https://lh3.googleusercontent.com/a/jane".into()),
        }
    }

    #[test]
    fn sign_and_verify_session() {
        let keys = make_keys("dev-secret", "intake", "intake-users");
        let token = keys.sign(&jane()).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "google-123");
        assert_eq!(claims.user, jane());
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn token_older_than_seven_days_is_rejected() {
        let keys = make_keys("dev-secret", "intake", "intake-users");
        let issued = OffsetDateTime::now_utc() - TimeDuration::days(7) - TimeDuration::minutes(1);
        let token = keys.sign_at(&jane(), issued).expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn six_day_old_token_is_still_valid() {
        let keys = make_keys("dev-secret", "intake", "intake-users");
        let issued = OffsetDateTime::now_utc() - TimeDuration::days(6);
        let token = keys.sign_at(&jane(), issued).expect("sign");
        assert!(keys.verify(&token).is_ok());
    }

    #[test]
    fn verify_rejects_other_secret() {
        let good = make_keys("secret-a", "intake", "intake-users");
        let bad = make_keys("secret-b", "intake", "intake-users");
        let token = good.sign(&jane()).expect("sign");
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.sign(&jane()).expect("sign");
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret", "intake", "intake-users");
        assert!(keys.verify("not.a.jwt").is_err());
    }
}
