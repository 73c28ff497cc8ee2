use std::sync::Arc;

use wasel_client::store::{DataStore, RestStore};
use wasel_client::{ClientConfig, HttpClient};

use super::{Config, Result};
use crate::sender::{LogSender, MessageSender};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，可直接作为 axum 的 `State`。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Arc<Config> | 配置项 (不可变) |
/// | store | Arc<dyn DataStore> | 托管数据存储 (服务角色密钥) |
/// | sender | Arc<dyn MessageSender> | 短信发送通道 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DataStore>,
    pub sender: Arc<dyn MessageSender>,
}

impl ServerState {
    /// 使用现有组件构造 (测试注入内存存储和发送器)
    pub fn new(config: Config, store: Arc<dyn DataStore>, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            sender,
        }
    }

    /// 根据配置初始化 REST 存储和默认发送器
    pub fn initialize(config: &Config) -> Result<Self> {
        let client_config = ClientConfig::new(&config.wasel_url, &config.service_role_key)
            .with_timeout(config.request_timeout().as_secs().max(1));
        let http = HttpClient::new(&client_config)?;
        let store: Arc<dyn DataStore> = Arc::new(RestStore::new(http));

        tracing::info!(url = %config.wasel_url, "Data store initialized");

        Ok(Self::new(config.clone(), store, Arc::new(LogSender)))
    }
}
