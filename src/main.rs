use storefront::{infrastructure::Logger, load_config, server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let _log_guard = Logger::init(&config.logging)?;

    info!("启动店铺后端服务...");
    server::run(config).await
}
