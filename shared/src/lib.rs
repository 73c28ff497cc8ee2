//! Shared types for the Wasel dashboard
//!
//! Types used by both the dashboard client core and the notification
//! function: domain rows, the auth session, change-feed events, the
//! notify-function wire format, and the unified error system.

pub mod error;
pub mod models;
pub mod notify;
pub mod realtime;
pub mod session;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::AppRole;
pub use realtime::{ChangeEvent, ChangeKind};
pub use session::{AuthUser, Session};
