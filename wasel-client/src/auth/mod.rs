//! Hosted auth provider access
//!
//! [`AuthProvider`] covers what the dashboard needs from the auth service:
//! password sign-in, sign-out, session refresh, phone OTP (MFA) and a stream of
//! auth-state events that the session provider listens to.

mod http;
mod memory;

pub use http::HttpAuthProvider;
pub use memory::MemoryAuthProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::Session;
use tokio::sync::broadcast;

use crate::ClientResult;

/// Auth-state change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

impl AuthEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed(_) => "TOKEN_REFRESHED",
        }
    }

    /// Session carried by the event (`None` for sign-out)
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(s) | Self::TokenRefreshed(s) => Some(s),
            Self::SignedOut => None,
        }
    }
}

/// Pending MFA challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MfaChallenge {
    pub id: String,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// Auth provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current session, `None` when signed out
    async fn get_session(&self) -> ClientResult<Option<Session>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session>;

    async fn sign_out(&self) -> ClientResult<()>;

    async fn refresh_session(&self) -> ClientResult<Session>;

    /// Auth-state events from now on
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// Send an OTP for `factor_id`
    async fn mfa_challenge(&self, factor_id: &str) -> ClientResult<MfaChallenge>;

    /// Verify the OTP; a successful verification upgrades the session
    async fn mfa_verify(
        &self,
        factor_id: &str,
        challenge_id: &str,
        code: &str,
    ) -> ClientResult<Session>;
}

/// 从 JWT token 中解析过期时间 (Unix timestamp)
pub fn parse_jwt_exp(token: &str) -> Option<i64> {
    // JWT 格式: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).ok()?;
    payload.get("exp")?.as_i64()
}
