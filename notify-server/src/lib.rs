//! Wasel Notify Server - 货件状态通知函数
//!
//! # 架构概述
//!
//! 本服务承载 `notify-status` 函数：
//!
//! - **HTTP API** (`api`): `POST /functions/v1/notify-status` 与 `GET /health`
//! - **消息模板** (`templates`): 状态 → 短信文本
//! - **发送通道** (`sender`): 运营商接入点 (默认只写日志)
//!
//! # 模块结构
//!
//! ```text
//! notify-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志
//! ├── sender.rs      # MessageSender
//! └── templates.rs   # 状态消息模板
//! ```

pub mod api;
pub mod core;
pub mod sender;
pub mod templates;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerError, ServerState};
pub use sender::{LogSender, MessageSender, OutgoingMessage, SendError};
pub use shared::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境
///
/// 加载 `.env` 并初始化日志。返回的 guard 必须在进程生命周期内持有，
/// 否则文件日志的后台写线程会提前退出。
pub fn setup_environment() -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok();

    init_logger_with_file(Some(&level), json, log_dir.as_deref().map(std::path::Path::new))
}

pub fn print_banner() {
    println!(
        r#"
 _       __                __
| |     / /___ _________  / /
| | /| / / __ `/ ___/ _ \/ /
| |/ |/ / /_/ (__  )  __/ /
|__/|__/\__,_/____/\___/_/
    notify-status
    "#
    );
}
