//! Route guard
//!
//! Decides whether the current session may open a dashboard path. Decisions
//! are recomputed on every call from the latest [`SessionState`].
//!
//! ```text
//! loading            -> Loading
//! no session         -> Denied  (/auth?from=<encoded path>)
//! guest              -> Allowed on / and /guest, else Denied (/guest)
//! allowed roles set  -> head_manager always Allowed
//!                       role in set Allowed
//!                       else Denied (courier/shipper home or policy redirect)
//! no allowed roles   -> Allowed
//! ```

mod decision;
mod table;

pub use decision::{DenyReason, GuardDecision, Redirect};
pub use table::{RouteGuard, RouteTable};

use shared::models::AppRole;

use crate::session::SessionState;

/// Sign-in page
pub const SIGN_IN_PATH: &str = "/auth";
/// Guest landing page
pub const GUEST_HOME: &str = "/guest";
/// Paths a guest may open
pub const GUEST_PATHS: [&str; 2] = ["/", GUEST_HOME];
pub const COURIER_HOME: &str = "/courier-dashboard";
pub const SHIPPER_HOME: &str = "/shipper-dashboard";
/// Redirect used when a policy does not name one
pub const DEFAULT_REDIRECT: &str = "/";

/// Access rule of one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Empty means any signed-in role
    pub allowed_roles: Vec<AppRole>,
    /// Where roles outside the set go (courier/shipper have fixed homes)
    pub redirect_to: String,
    /// Public routes skip the guard entirely (sign-in page)
    pub public: bool,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::authenticated()
    }
}

impl RoutePolicy {
    /// Any signed-in role
    pub fn authenticated() -> Self {
        Self {
            allowed_roles: Vec::new(),
            redirect_to: DEFAULT_REDIRECT.into(),
            public: false,
        }
    }

    pub fn public() -> Self {
        Self {
            public: true,
            ..Self::authenticated()
        }
    }

    pub fn roles(roles: &[AppRole]) -> Self {
        Self {
            allowed_roles: roles.to_vec(),
            ..Self::authenticated()
        }
    }

    pub fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = path.into();
        self
    }
}

/// Fallback destination for a role refused by a route
pub fn role_home(role: AppRole, policy: &RoutePolicy) -> &str {
    match role {
        AppRole::Courier => COURIER_HOME,
        AppRole::Shipper => SHIPPER_HOME,
        _ => policy.redirect_to.as_str(),
    }
}

/// Strip query, fragment and trailing slash
pub fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Evaluate one navigation
pub fn evaluate(state: &SessionState, path: &str, policy: &RoutePolicy) -> GuardDecision {
    if policy.public {
        return GuardDecision::Allowed;
    }
    if state.loading {
        return GuardDecision::Loading;
    }
    if !state.is_authenticated() {
        return GuardDecision::Denied(Redirect::sign_in(path));
    }

    // A session without a role only exists transiently; treat it like `user`
    let role = state.role.unwrap_or(AppRole::User);

    if role == AppRole::Guest {
        let normalized = normalize_path(path);
        if GUEST_PATHS.contains(&normalized) {
            return GuardDecision::Allowed;
        }
        return GuardDecision::Denied(Redirect::new(GUEST_HOME, DenyReason::GuestRestricted));
    }

    if !policy.allowed_roles.is_empty() {
        if role == AppRole::HeadManager || policy.allowed_roles.contains(&role) {
            return GuardDecision::Allowed;
        }
        return GuardDecision::Denied(Redirect::new(
            role_home(role, policy),
            DenyReason::RoleNotAllowed,
        ));
    }

    GuardDecision::Allowed
}
