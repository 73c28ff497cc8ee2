//! Auth session
//!
//! The identity and tokens handed out by the hosted auth provider. Only the
//! Session/Role provider owns a live `Session`; everything else sees clones.

use serde::{Deserialize, Serialize};

/// Authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Auth session (identity token + expiry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiry as unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Whether the session has expired at `now` (unix seconds)
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(crate::util::now_secs())
    }

    /// Seconds until expiry, `None` when the provider gave no expiry
    pub fn expires_in(&self) -> Option<i64> {
        self.expires_at.map(|exp| exp - crate::util::now_secs())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
