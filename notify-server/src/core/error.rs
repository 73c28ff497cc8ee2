use thiserror::Error;

/// 服务器启动与运行错误
///
/// 请求级错误使用 [`shared::AppError`]；这里只覆盖进程级失败。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("数据存储初始化失败: {0}")]
    Store(#[from] wasel_client::ClientError),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
