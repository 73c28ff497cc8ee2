//! 货件状态通知函数
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /functions/v1/notify-status | POST | 写审计备注并发送状态短信 |
//!
//! 审计备注写入失败会让整个请求失败；短信发送失败只记日志，
//! 响应仍为成功，`notification_sent = false`。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::{audit_note, notify_status};

pub const NOTIFY_STATUS_PATH: &str = "/functions/v1/notify-status";

pub fn router() -> Router<ServerState> {
    Router::new().route(NOTIFY_STATUS_PATH, post(notify_status))
}
