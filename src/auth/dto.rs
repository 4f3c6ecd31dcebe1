use serde::{Deserialize, Serialize};

use super::claims::SessionIdentity;

/// Body of `POST /api/auth/google`.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub credential: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: SessionIdentity,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionIdentity,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}
