use serde::{Deserialize, Serialize};

/// Identity carried inside a session token. `id` is the Google subject id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionIdentity {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// JWT payload stored in the `session` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // google subject id
    pub user: SessionIdentity,
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,    // unix millis, mirrors exp for browser clients
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}
