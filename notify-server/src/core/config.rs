use std::time::Duration;

use super::{Result, ServerError};

const DEFAULT_HTTP_PORT: u16 = 8787;
const DEFAULT_WASEL_URL: &str = "http://localhost:54321";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15000;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 8787 | HTTP 服务端口 |
/// | WASEL_URL | http://localhost:54321 | 托管后端地址 |
/// | WASEL_SERVICE_ROLE_KEY | (必填) | 服务角色密钥，用于写审计备注 |
/// | LOG_LEVEL | info | 日志级别 / EnvFilter 表达式 |
/// | LOG_DIR | (无) | 设置后按天滚动写文件 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 15000 | 请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WASEL_SERVICE_ROLE_KEY=... HTTP_PORT=9000 cargo run -p notify-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 托管后端根地址
    pub wasel_url: String,
    pub service_role_key: String,
    pub log_level: String,
    /// 日志目录 (None = 只输出到 stdout)
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

impl Config {
    /// 用默认值构造，常用于测试场景
    pub fn new(wasel_url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            wasel_url: wasel_url.into(),
            service_role_key: service_role_key.into(),
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
            environment: "development".into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    /// 从环境变量加载配置
    ///
    /// 除服务角色密钥外，未设置的项使用默认值
    pub fn from_env() -> Result<Self> {
        let service_role_key = std::env::var("WASEL_SERVICE_ROLE_KEY")
            .map_err(|_| ServerError::Config("WASEL_SERVICE_ROLE_KEY is not set".into()))?;

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_HTTP_PORT),
            wasel_url: std::env::var("WASEL_URL").unwrap_or_else(|_| DEFAULT_WASEL_URL.into()),
            service_role_key,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
