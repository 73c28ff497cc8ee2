use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shared::Session;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{RoleSource, SessionState, resolve_role};
use crate::auth::{AuthEvent, AuthProvider, MfaChallenge};
use crate::store::DataStore;
use crate::ClientResult;

/// How long `sign_in` waits for the provider task to publish the new session
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// 会话/角色提供者
///
/// One background task owns the auth-event subscription and is the only
/// writer of the published state, so re-resolutions never interleave. Local
/// sign-out is a command to that task, applied after every auth event already
/// queued. The task stops on [`SessionProvider::shutdown`] or when the
/// provider is dropped.
pub struct SessionProvider {
    auth: Arc<dyn AuthProvider>,
    state: Arc<watch::Sender<SessionState>>,
    commands: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SessionProvider {
    /// Start tracking; the state reads `loading = true` until the initial
    /// session and role are resolved
    pub fn start(auth: Arc<dyn AuthProvider>, store: Arc<dyn DataStore>) -> Self {
        let (tx, _) = watch::channel(SessionState::loading());
        let state = Arc::new(tx);
        let shutdown = CancellationToken::new();

        // Subscribe before the initial fetch so no event falls in between
        let events = auth.subscribe();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let worker = ProviderTask {
            auth: Arc::clone(&auth),
            store,
            state: Arc::clone(&state),
        };
        let handle = tokio::spawn(worker.run(events, command_rx, shutdown.clone()));

        Self {
            auth,
            state,
            commands,
            shutdown,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Wait for the initial resolution
    pub async fn ready(&self) -> SessionState {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| !s.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Password sign-in; returns once the new session and its role are published
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<SessionState> {
        let mut rx = self.subscribe();
        let session = self.auth.sign_in_with_password(email, password).await?;
        tracing::info!(user_id = %session.user.id, "signed in");
        Ok(self.settle(&mut rx, &session).await)
    }

    /// Sign out; local state is cleared even when the remote call fails
    pub async fn sign_out(&self) -> ClientResult<()> {
        let result = self.auth.sign_out().await;
        self.clear_local().await;
        match &result {
            Ok(()) => tracing::info!("signed out"),
            Err(e) => tracing::warn!("remote sign-out failed, local session cleared: {e}"),
        }
        result
    }

    pub async fn refresh_session(&self) -> ClientResult<SessionState> {
        let mut rx = self.subscribe();
        let session = self.auth.refresh_session().await?;
        Ok(self.settle(&mut rx, &session).await)
    }

    pub async fn mfa_challenge(&self, factor_id: &str) -> ClientResult<MfaChallenge> {
        self.auth.mfa_challenge(factor_id).await
    }

    pub async fn mfa_verify(
        &self,
        factor_id: &str,
        challenge_id: &str,
        code: &str,
    ) -> ClientResult<SessionState> {
        let mut rx = self.subscribe();
        let session = self.auth.mfa_verify(factor_id, challenge_id, code).await?;
        Ok(self.settle(&mut rx, &session).await)
    }

    /// Stop the background task and wait for it
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// 通过后台任务清空本地状态；任务已停止时直接写
    async fn clear_local(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::SignOut(ack)).is_ok() && done.await.is_ok() {
            return;
        }
        self.state.send_replace(SessionState::signed_out());
    }

    async fn settle(&self, rx: &mut watch::Receiver<SessionState>, session: &Session) -> SessionState {
        let token = session.access_token.as_str();
        let waited = tokio::time::timeout(
            SETTLE_TIMEOUT,
            rx.wait_for(|s| !s.loading && s.access_token() == Some(token)),
        )
        .await;
        match waited {
            Ok(Ok(state)) => state.clone(),
            _ => {
                tracing::warn!("session state did not settle after auth change");
                self.snapshot()
            }
        }
    }
}

impl Drop for SessionProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

enum Command {
    SignOut(oneshot::Sender<()>),
}

struct ProviderTask {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DataStore>,
    state: Arc<watch::Sender<SessionState>>,
}

impl ProviderTask {
    async fn run(
        self,
        mut events: broadcast::Receiver<AuthEvent>,
        mut commands: mpsc::UnboundedReceiver<Command>,
        shutdown: CancellationToken,
    ) {
        tracing::info!("session provider started");

        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = self.bootstrap() => {}
        }

        loop {
            // 已排队的 auth 事件先于命令处理
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                result = events.recv() => match result {
                    Ok(event) => {
                        tracing::debug!(event = event.name(), "auth event");
                        self.apply(event.session().cloned()).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("session provider lagged {n} auth events, re-reading session");
                        self.bootstrap().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("auth event channel closed");
                        break;
                    }
                },
                Some(command) = commands.recv() => match command {
                    Command::SignOut(ack) => {
                        self.state.send_replace(SessionState::signed_out());
                        let _ = ack.send(());
                    }
                },
            }
        }

        tracing::info!("session provider stopped");
    }

    /// Read the current session from the auth provider and resolve it
    async fn bootstrap(&self) {
        let session = match self.auth.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("initial session fetch failed, treating as signed out: {e}");
                None
            }
        };
        self.apply(session).await;
    }

    async fn apply(&self, session: Option<Session>) {
        let next = match session.filter(|s| !s.is_expired()) {
            Some(session) => {
                let (role, source) = resolve_role(self.store.as_ref(), session.user_id()).await;
                if let RoleSource::Defaulted { reason } = &source {
                    tracing::debug!(user_id = %session.user.id, %reason, "role defaulted");
                }
                SessionState::signed_in(session, role, source)
            }
            None => SessionState::signed_out(),
        };
        self.state.send_replace(next);
    }
}
