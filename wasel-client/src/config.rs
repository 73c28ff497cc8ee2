//! Client configuration

use std::time::Duration;

use crate::{ClientError, ClientResult};

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default realtime heartbeat interval (seconds)
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;
/// Default notification ring capacity
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 500;

/// Client configuration for connecting to the hosted backend
///
/// # 环境变量
///
/// | 变量 | 默认值 | 说明 |
/// |------|--------|------|
/// | WASEL_URL | (必填) | 后端基础地址 |
/// | WASEL_ANON_KEY | (必填) | 公开 API key |
/// | WASEL_TIMEOUT_SECS | 30 | 请求超时 |
/// | WASEL_REALTIME_HEARTBEAT_SECS | 30 | 实时连接心跳间隔 |
/// | WASEL_NOTIFICATION_CAPACITY | 500 | 通知列表容量 |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "https://project.wasel.app")
    pub base_url: String,

    /// Public API key sent as `apikey` on every request
    pub anon_key: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Realtime heartbeat interval in seconds
    pub heartbeat_secs: u64,

    /// Max notifications kept in memory
    pub notification_capacity: usize,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }

    /// Load configuration from the environment (reads `.env` when present)
    pub fn from_env() -> ClientResult<Self> {
        dotenv::dotenv().ok();

        let base_url = std::env::var("WASEL_URL")
            .map_err(|_| ClientError::Config("WASEL_URL is not set".into()))?;
        let anon_key = std::env::var("WASEL_ANON_KEY")
            .map_err(|_| ClientError::Config("WASEL_ANON_KEY is not set".into()))?;

        Ok(Self {
            base_url,
            anon_key,
            timeout: env_parse("WASEL_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            heartbeat_secs: env_parse("WASEL_REALTIME_HEARTBEAT_SECS", DEFAULT_HEARTBEAT_SECS)
                .max(1),
            notification_capacity: env_parse(
                "WASEL_NOTIFICATION_CAPACITY",
                DEFAULT_NOTIFICATION_CAPACITY,
            ),
        })
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Heartbeat interval, at least one second
    pub fn with_heartbeat(mut self, seconds: u64) -> Self {
        self.heartbeat_secs = seconds.max(1);
        self
    }

    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity.max(1);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs.max(1))
    }

    /// Base URL without trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// `<base>/rest/v1`
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base())
    }

    /// `<base>/auth/v1`
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.base())
    }

    /// `<base>/functions/v1`
    pub fn functions_url(&self) -> String {
        format!("{}/functions/v1", self.base())
    }

    /// Realtime websocket endpoint (`ws`/`wss` scheme derived from the base URL)
    pub fn realtime_url(&self) -> String {
        let base = self.base();
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!(
            "{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            urlencoding::encode(&self.anon_key)
        )
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:54321", "")
    }
}
