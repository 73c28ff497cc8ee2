//! In-process auth provider

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared::{AuthUser, Session};
use tokio::sync::broadcast;

use super::{AuthEvent, AuthProvider, MfaChallenge};
use crate::{ClientError, ClientResult};

const SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthUser,
}

/// Auth provider backed by a fixed account table
///
/// Used by tests and offline demos. Every sign-in issues a fresh opaque token
/// valid for one hour.
pub struct MemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
    mfa_code: Mutex<Option<String>>,
    fail_sign_out: AtomicBool,
    counter: AtomicU64,
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            events,
            mfa_code: Mutex::new(None),
            fail_sign_out: AtomicBool::new(false),
            counter: AtomicU64::new(0),
        }
    }

    pub fn add_account(&self, email: &str, password: &str, user_id: &str) {
        self.accounts.write().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: AuthUser {
                    id: user_id.to_string(),
                    email: Some(email.to_string()),
                    phone: None,
                },
            },
        );
    }

    /// Sign `email` in without emitting an event (a session persisted from
    /// an earlier run)
    pub fn restore_session(&self, email: &str) -> Option<Session> {
        let user = self.accounts.read().get(email).map(|a| a.user.clone())?;
        let session = self.issue(user);
        *self.session.write() = Some(session.clone());
        Some(session)
    }

    /// Make the remote half of `sign_out` fail
    pub fn set_fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    pub fn current(&self) -> Option<Session> {
        self.session.read().clone()
    }

    fn issue(&self, user: AuthUser) -> Session {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Session {
            access_token: format!("token-{}-{n}", user.id),
            refresh_token: Some(format!("refresh-{}-{n}", user.id)),
            token_type: "bearer".into(),
            expires_at: Some(shared::util::now_secs() + SESSION_TTL_SECS),
            user,
        }
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn get_session(&self) -> ClientResult<Option<Session>> {
        Ok(self.session.read().clone().filter(|s| !s.is_expired()))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session> {
        let user = {
            let accounts = self.accounts.read();
            match accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(ClientError::InvalidCredentials),
            }
        };
        let session = self.issue(user);
        *self.session.write() = Some(session.clone());
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> ClientResult<()> {
        *self.session.write() = None;
        self.emit(AuthEvent::SignedOut);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("sign-out request failed".into()));
        }
        Ok(())
    }

    async fn refresh_session(&self) -> ClientResult<Session> {
        let user = self
            .session
            .read()
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or(ClientError::SessionExpired)?;
        let session = self.issue(user);
        *self.session.write() = Some(session.clone());
        self.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn mfa_challenge(&self, factor_id: &str) -> ClientResult<MfaChallenge> {
        if self.session.read().is_none() {
            return Err(ClientError::Unauthorized);
        }
        let code = format!("{:06}", rand::random::<u32>() % 1_000_000);
        tracing::debug!(factor_id, "issued MFA challenge");
        *self.mfa_code.lock() = Some(code);
        Ok(MfaChallenge {
            id: format!("challenge-{factor_id}"),
            expires_at: Some(shared::util::now_secs() + 300),
        })
    }

    async fn mfa_verify(
        &self,
        factor_id: &str,
        challenge_id: &str,
        code: &str,
    ) -> ClientResult<Session> {
        let expected = self.mfa_code.lock().take();
        if challenge_id != format!("challenge-{factor_id}") || expected.as_deref() != Some(code) {
            return Err(ClientError::MfaRejected);
        }
        self.refresh_session().await
    }
}

impl MemoryAuthProvider {
    /// Code of the last issued challenge (tests read it instead of an SMS)
    pub fn last_mfa_code(&self) -> Option<String> {
        self.mfa_code.lock().clone()
    }
}
