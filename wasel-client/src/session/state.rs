use shared::models::AppRole;
use shared::Session;

/// Where the current role came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSource {
    /// Read from the role table
    Resolved,
    /// Lookup failed or found nothing usable; role fell back to `user`
    Defaulted { reason: String },
}

impl RoleSource {
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }
}

/// 会话状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// True until the initial resolution finished
    pub loading: bool,
    pub session: Option<Session>,
    /// Set whenever `session` is set and loading is over
    pub role: Option<AppRole>,
    pub role_source: Option<RoleSource>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::loading()
    }
}

impl SessionState {
    pub fn loading() -> Self {
        Self {
            loading: true,
            session: None,
            role: None,
            role_source: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            loading: false,
            session: None,
            role: None,
            role_source: None,
        }
    }

    pub fn signed_in(session: Session, role: AppRole, source: RoleSource) -> Self {
        Self {
            loading: false,
            session: Some(session),
            role: Some(role),
            role_source: Some(source),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user.id.as_str())
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }
}
