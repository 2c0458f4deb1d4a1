//! HTTP 服务组装与启动

use axum::{
    error_handling::HandleErrorLayer, extract::DefaultBodyLimit, middleware, BoxError, Router,
};
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::app::{
    self,
    photos::{PhotoStore, UPLOADS_ROUTE},
    reviews::ReviewService,
    stock::StockLedger,
    AppState,
};
use crate::config::Config;
use crate::core::{error::CoreError, middleware::request_logging_middleware};
use crate::infrastructure::{DocumentStore, FileKvStore};

/// 表单中除图片以外部分允许的额外字节数
pub const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// 按配置创建服务并准备好评论文档和上传目录
pub async fn build_state(config: &Config) -> Result<AppState, CoreError> {
    let reviews = ReviewService::new(
        DocumentStore::new(&config.storage.reviews_file),
        PhotoStore::new(&config.storage.uploads_dir, config.storage.max_photo_bytes),
    );
    reviews.initialize().await?;

    let stock = StockLedger::new(FileKvStore::new(&config.stock.store_file));

    Ok(AppState::new(reviews, stock))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let mut router = app::router(state)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&config.storage.uploads_dir));

    if let Some(static_dir) = &config.server.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
        .layer(DefaultBodyLimit::max(
            config.storage.max_photo_bytes + FORM_OVERHEAD_BYTES,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(config.server.timeout_seconds)),
        )
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// 把中间件产生的错误渲染成统一的错误响应
pub async fn handle_middleware_error(err: BoxError) -> CoreError {
    if err.is::<Elapsed>() {
        CoreError::Timeout
    } else {
        error!("中间件处理失败: {}", err);
        CoreError::InternalServerError("Internal server error".to_string())
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&address).await?;

    info!("🚀 服务器运行在 http://{}", address);
    info!("📝 评论文件: {}", config.storage.reviews_file.display());
    info!("📸 上传目录: {}", config.storage.uploads_dir.display());
    info!("📦 库存文件: {}", config.stock.store_file.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务器已关闭");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("收到 Ctrl+C，正在关闭"),
            Err(e) => {
                warn!("无法监听 Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("收到 terminate 信号，正在关闭");
            }
            Err(e) => {
                warn!("无法监听 terminate 信号: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
