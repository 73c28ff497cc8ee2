//! Declarative route surface

use shared::models::AppRole;

use super::{GuardDecision, RoutePolicy, evaluate, normalize_path};
use crate::session::SessionState;

#[derive(Debug, Clone)]
struct RouteEntry {
    /// Path segments; `:name` matches any single segment
    segments: Vec<String>,
    pattern: String,
    policy: RoutePolicy,
}

impl RouteEntry {
    fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_segments(path).collect();
        parts.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(parts)
                .all(|(seg, part)| seg.starts_with(':') || seg == part)
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Ordered route table; first match wins
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
    /// Policy for paths no route matches
    fallback: RoutePolicy,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, policy: RoutePolicy) -> Self {
        self.routes.push(RouteEntry {
            segments: split_segments(pattern).map(str::to_string).collect(),
            pattern: pattern.to_string(),
            policy,
        });
        self
    }

    pub fn fallback(mut self, policy: RoutePolicy) -> Self {
        self.fallback = policy;
        self
    }

    /// Policy for `path` and the pattern that matched it
    pub fn lookup(&self, path: &str) -> (&RoutePolicy, Option<&str>) {
        let path = normalize_path(path);
        self.routes
            .iter()
            .find(|r| r.matches(path))
            .map(|r| (&r.policy, Some(r.pattern.as_str())))
            .unwrap_or((&self.fallback, None))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.as_str())
    }

    /// The dashboard's routes
    pub fn dashboard() -> Self {
        use AppRole::*;

        let managers = || RoutePolicy::roles(&[Manager]);
        Self::new()
            .route("/auth", RoutePolicy::public())
            .route("/", RoutePolicy::authenticated())
            .route("/guest", RoutePolicy::authenticated())
            .route("/profile", RoutePolicy::authenticated())
            .route("/dashboard", managers())
            .route("/shipments", managers())
            .route("/shipments/:id", RoutePolicy::roles(&[Manager, Courier, Shipper]))
            .route("/delegates", managers())
            .route("/delegates/:id", managers())
            .route("/stores", RoutePolicy::roles(&[Manager, Shipper]))
            .route("/sheets", managers())
            .route("/sheets/:id", managers())
            .route("/balances", managers())
            .route("/reports", managers())
            .route("/complaints", managers())
            .route("/whatsapp", managers())
            .route("/users", RoutePolicy::roles(&[HeadManager]))
            .route(super::COURIER_HOME, RoutePolicy::roles(&[Courier]))
            .route(super::SHIPPER_HOME, RoutePolicy::roles(&[Shipper]))
    }
}

/// Route guard bound to a route table
#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: RouteTable,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(RouteTable::dashboard())
    }
}

impl RouteGuard {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Evaluate a navigation against the current state
    pub fn check(&self, state: &SessionState, path: &str) -> GuardDecision {
        let (policy, pattern) = self.table.lookup(path);
        let decision = evaluate(state, path, policy);
        if let GuardDecision::Denied(redirect) = &decision {
            tracing::debug!(path, ?pattern, to = %redirect.to, "navigation denied");
            crate::security_log!(
                INFO,
                "route_denied",
                path = %path,
                reason = redirect.reason.as_str(),
                user_id = ?state.user_id()
            );
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{COURIER_HOME, GUEST_HOME, SIGN_IN_PATH};
    use crate::session::RoleSource;
    use shared::{AuthUser, Session};

    fn signed_in(role: AppRole) -> SessionState {
        SessionState::signed_in(
            Session {
                access_token: "t".into(),
                refresh_token: None,
                token_type: "bearer".into(),
                expires_at: None,
                user: AuthUser {
                    id: "u".into(),
                    email: None,
                    phone: None,
                },
            },
            role,
            RoleSource::Resolved,
        )
    }

    #[test]
    fn test_lookup_patterns() {
        let table = RouteTable::dashboard();
        assert_eq!(table.lookup("/shipments/abc").1, Some("/shipments/:id"));
        assert_eq!(table.lookup("/shipments/").1, Some("/shipments"));
        assert_eq!(table.lookup("/nowhere").1, None);
        assert!(table.lookup("/auth?from=/x").0.public);
    }

    #[test]
    fn test_dashboard_guard() {
        let guard = RouteGuard::default();
        let courier = signed_in(AppRole::Courier);
        assert!(guard.check(&courier, "/shipments/s-1").is_allowed());
        assert!(guard.check(&courier, COURIER_HOME).is_allowed());
        assert_eq!(
            guard.check(&courier, "/sheets").redirect().unwrap().to,
            COURIER_HOME
        );

        let manager = signed_in(AppRole::Manager);
        assert!(guard.check(&manager, "/sheets/7").is_allowed());
        assert!(!guard.check(&manager, "/users").is_allowed());
        assert!(guard.check(&signed_in(AppRole::HeadManager), "/users").is_allowed());

        let guest = signed_in(AppRole::Guest);
        assert_eq!(guard.check(&guest, "/profile").redirect().unwrap().to, GUEST_HOME);

        let decision = guard.check(&SessionState::signed_out(), "/balances");
        assert_eq!(decision.redirect().unwrap().to, SIGN_IN_PATH);
        assert!(guard.check(&SessionState::signed_out(), "/auth").is_allowed());
    }
}
