use std::fmt;

use super::SIGN_IN_PATH;

/// Why a navigation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotAuthenticated,
    GuestRestricted,
    RoleNotAllowed,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::GuestRestricted => "guest_restricted",
            Self::RoleNotAllowed => "role_not_allowed",
        }
    }
}

/// Redirect target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Requested location, carried to the sign-in page
    pub from: Option<String>,
    pub reason: DenyReason,
}

impl Redirect {
    pub fn new(to: impl Into<String>, reason: DenyReason) -> Self {
        Self {
            to: to.into(),
            from: None,
            reason,
        }
    }

    pub fn sign_in(from: &str) -> Self {
        Self {
            to: SIGN_IN_PATH.into(),
            from: Some(from.to_string()),
            reason: DenyReason::NotAuthenticated,
        }
    }

    /// Target with the `from` query parameter appended
    pub fn location(&self) -> String {
        match &self.from {
            Some(from) => format!("{}?from={}", self.to, urlencoding::encode(from)),
            None => self.to.clone(),
        }
    }
}

/// 路由守卫结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving; render a placeholder
    Loading,
    Allowed,
    Denied(Redirect),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Denied(redirect) => Some(redirect),
            _ => None,
        }
    }
}

impl fmt::Display for GuardDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "LOADING"),
            Self::Allowed => write!(f, "ALLOWED"),
            Self::Denied(r) => write!(f, "DENIED -> {}", r.location()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location() {
        let redirect = Redirect::sign_in("/sheets/7?tab=open");
        assert_eq!(
            redirect.location(),
            "/auth?from=%2Fsheets%2F7%3Ftab%3Dopen"
        );
        // 非 ASCII 路径按 UTF-8 编码
        assert_eq!(
            Redirect::sign_in("/تقارير").location(),
            "/auth?from=%2F%D8%AA%D9%82%D8%A7%D8%B1%D9%8A%D8%B1"
        );
        assert_eq!(
            Redirect::new("/guest", DenyReason::GuestRestricted).location(),
            "/guest"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(GuardDecision::Loading.to_string(), "LOADING");
        assert_eq!(
            GuardDecision::Denied(Redirect::sign_in("/x")).to_string(),
            "DENIED -> /auth?from=%2Fx"
        );
    }
}
