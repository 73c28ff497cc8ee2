//! Role Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 授权角色 (固定枚举)
///
/// Stored as snake_case text in `user_roles.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    /// 总经理 - bypasses every role restriction
    HeadManager,
    Manager,
    /// 快递员 (delegate)
    Courier,
    /// 发货商
    Shipper,
    /// Generic signed-in user; the fallback when no role row exists
    User,
    /// Restricted to the guest landing pages
    Guest,
}

impl AppRole {
    pub const ALL: [AppRole; 6] = [
        AppRole::HeadManager,
        AppRole::Manager,
        AppRole::Courier,
        AppRole::Shipper,
        AppRole::User,
        AppRole::Guest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeadManager => "head_manager",
            Self::Manager => "manager",
            Self::Courier => "courier",
            Self::Shipper => "shipper",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for AppRole {
    type Err = UnknownRole;

    /// Accepts `head_manager` as well as `head-manager`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "head_manager" => Ok(Self::HeadManager),
            "manager" => Ok(Self::Manager),
            "courier" => Ok(Self::Courier),
            "shipper" => Ok(Self::Shipper),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// `user_roles` row
///
/// `role` stays a raw string here; rows written by other tools may hold
/// values outside [`AppRole`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleRow {
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    pub role: String,
}

impl UserRoleRow {
    pub fn parsed_role(&self) -> Option<AppRole> {
        self.role.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!("head_manager".parse(), Ok(AppRole::HeadManager));
        assert_eq!("Head-Manager".parse(), Ok(AppRole::HeadManager));
        assert_eq!(" courier ".parse(), Ok(AppRole::Courier));
        assert!("admin".parse::<AppRole>().is_err());
    }

    #[test]
    fn test_as_str_roundtrip() {
        for role in AppRole::ALL {
            assert_eq!(role.as_str().parse(), Ok(role));
        }
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&AppRole::HeadManager).unwrap();
        assert_eq!(json, "\"head_manager\"");
    }

    #[test]
    fn test_row_with_unknown_role() {
        let row: UserRoleRow =
            serde_json::from_str(r#"{"user_id":"u1","role":"superuser"}"#).unwrap();
        assert_eq!(row.parsed_role(), None);
    }
}
