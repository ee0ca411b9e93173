use std::sync::Arc;

use product_catalog::{
    create_router,
    infrastructure::{config::load_config, logger::Logger, store::JsonFileStore},
    AppState, ENDPOINTS,
};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let _log_guard = Logger::init(&config.logging)?;

    info!("启动产品目录服务...");

    let store = JsonFileStore::new(config.storage.products_file.clone());
    store.initialize()?;
    info!("产品文档: {}", store.path().display());

    let state = AppState::new(Arc::new(store), &config);
    let app = create_router(state);

    let addr = config.http.listen_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 服务运行在 http://{}", addr);
    info!("📖 API 端点:");
    for (method, path) in ENDPOINTS {
        info!("   {:<7} {}", method, path);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("无法监听关闭信号: {}", e);
        std::future::pending::<()>().await;
    }
}
