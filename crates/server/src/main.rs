// labor-board main.rs
// HTTP service for the pack department labor board

use anyhow::Context;
use labor_board_server::{build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "labor_board_server=info,labor_board_core=info,tower_http=info".into()
            }),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ServerConfig::from_args(&args);

    let state = AppState::open(&config)
        .with_context(|| format!("Failed to prepare data directory {:?}", config.data_dir))?;

    tracing::info!("📁 Data file: {:?}", config.store_path());
    tracing::info!("📤 Uploads: {:?}", config.upload_dir());
    tracing::info!("🗂  Static: {:?}", config.static_dir);

    let app = build_router(state, &config.static_dir);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 Labor board listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Labor board stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
