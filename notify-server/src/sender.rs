//! 消息发送通道
//!
//! [`MessageSender`] 是运营商接入点。当前部署只有 [`LogSender`]，
//! 它把消息写进日志而不真正发短信。

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// 一条待发送的短信
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub to: String,
    pub recipient_name: String,
    pub body: String,
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("carrier rejected message: {0}")]
    Rejected(String),

    #[error("carrier unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Carrier name used in logs
    fn name(&self) -> &str;

    async fn send(&self, message: &OutgoingMessage) -> Result<(), SendError>;
}

/// 只记录日志的发送器
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSender;

#[async_trait]
impl MessageSender for LogSender {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, message: &OutgoingMessage) -> Result<(), SendError> {
        tracing::info!(
            to = %message.to,
            recipient = %message.recipient_name,
            body = %message.body,
            "SMS (log only)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let message = OutgoingMessage {
            to: "+9647700000000".into(),
            recipient_name: "Ali".into(),
            body: "hello".into(),
        };
        assert!(LogSender.send(&message).await.is_ok());
        assert_eq!(LogSender.name(), "log");
    }
}
