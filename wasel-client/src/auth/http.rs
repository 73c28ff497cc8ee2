//! Auth REST client (`/auth/v1`)

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use shared::{AuthUser, Session};
use tokio::sync::broadcast;

use super::{AuthEvent, AuthProvider, MfaChallenge, parse_jwt_exp};
use crate::http::HttpClient;
use crate::{ClientError, ClientResult};

const EVENT_CAPACITY: usize = 16;

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| parse_jwt_exp(&self.access_token))
            .or_else(|| self.expires_in.map(|s| shared::util::now_secs() + s));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
            expires_at,
            user: self.user,
        }
    }
}

/// Auth provider over the hosted auth REST API
///
/// Keeps the current session in memory and mirrors its access token into the
/// shared [`HttpClient`] so data-store calls run as the signed-in user.
pub struct HttpAuthProvider {
    http: HttpClient,
    auth_url: String,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl HttpAuthProvider {
    pub fn new(http: HttpClient) -> Self {
        let auth_url = http.config().auth_url();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            http,
            auth_url,
            session: RwLock::new(None),
            events,
        }
    }

    /// Seed a persisted session (e.g. restored at startup)
    pub fn restore(&self, session: Session) {
        self.install(Some(session));
    }

    fn install(&self, session: Option<Session>) {
        self.http
            .set_token(session.as_ref().map(|s| s.access_token.clone()));
        *self.session.write() = session;
    }

    fn emit(&self, event: AuthEvent) {
        tracing::debug!(event = event.name(), "auth state changed");
        // No receivers is fine
        let _ = self.events.send(event);
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> ClientResult<Session> {
        let url = format!("{}/token", self.auth_url);
        let request = self
            .http
            .request(Method::POST, &url)
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let response: TokenResponse = self.http.send_json(request).await?;
        Ok(response.into_session())
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn get_session(&self) -> ClientResult<Option<Session>> {
        let current = self.session.read().clone();
        match current {
            Some(session) if session.is_expired() => {
                if session.refresh_token.is_some() {
                    self.refresh_session().await.map(Some)
                } else {
                    self.install(None);
                    Ok(None)
                }
            }
            other => Ok(other),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session> {
        let session = match self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await
        {
            Ok(session) => session,
            Err(ClientError::Validation(msg)) => {
                crate::security_log!(WARN, "sign_in_failed", email = %email, reason = %msg);
                return Err(ClientError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };
        self.install(Some(session.clone()));
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> ClientResult<()> {
        let url = format!("{}/logout", self.auth_url);
        let result = self.http.send(self.http.request(Method::POST, &url)).await;
        // Local state goes regardless of the remote outcome
        self.install(None);
        self.emit(AuthEvent::SignedOut);
        result.map(|_| ())
    }

    async fn refresh_session(&self) -> ClientResult<Session> {
        let refresh_token = self
            .session
            .read()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or(ClientError::SessionExpired)?;
        let session = self
            .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;
        self.install(Some(session.clone()));
        self.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn mfa_challenge(&self, factor_id: &str) -> ClientResult<MfaChallenge> {
        let url = format!("{}/factors/{}/challenge", self.auth_url, factor_id);
        let request = self.http.request(Method::POST, &url).json(&json!({}));
        self.http.send_json(request).await
    }

    async fn mfa_verify(
        &self,
        factor_id: &str,
        challenge_id: &str,
        code: &str,
    ) -> ClientResult<Session> {
        let url = format!("{}/factors/{}/verify", self.auth_url, factor_id);
        let request = self
            .http
            .request(Method::POST, &url)
            .json(&json!({ "challenge_id": challenge_id, "code": code }));
        let response: TokenResponse = match self.http.send_json(request).await {
            Ok(r) => r,
            Err(ClientError::Validation(msg)) | Err(ClientError::Forbidden(msg)) => {
                crate::security_log!(WARN, "mfa_verify_failed", factor_id = %factor_id, reason = %msg);
                return Err(ClientError::MfaRejected);
            }
            Err(e) => return Err(e),
        };
        let session = response.into_session();
        self.install(Some(session.clone()));
        self.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }
}
