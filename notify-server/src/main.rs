use notify_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 设置环境 (dotenv, 日志)
    let _log_guard = setup_environment()?;

    // 打印横幅
    print_banner();

    tracing::info!("Wasel notify server starting...");

    // 2. 加载配置
    let config = Config::from_env()?;

    // 3. 初始化服务器状态
    let state = ServerState::initialize(&config)?;

    // 4. 启动 HTTP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
