//! Wasel Client - dashboard core for the hosted shipment backend
//!
//! - [`session`]: Session/Role provider
//! - [`guard`]: route guard and route table
//! - [`notifications`]: shipment change alerts
//! - [`hooks`]: per-entity repositories and query state
//! - [`store`], [`auth`], [`realtime`], [`functions`]: backend access

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod functions;
pub mod guard;
pub mod hooks;
pub mod http;
pub mod notifications;
pub mod realtime;
pub mod session;
pub mod store;

pub use client::WaselClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::{AppRole, AuthUser, ChangeEvent, ChangeKind, Session};

/// 安全日志宏 - 记录认证失败与路由拒绝 (target: security)
#[macro_export]
macro_rules! security_log {
    ($level:ident, $event:expr $(, $($fields:tt)*)?) => {
        tracing::event!(
            target: "security",
            tracing::Level::$level,
            event = $event
            $(, $($fields)*)?
        )
    };
}
