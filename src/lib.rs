pub mod error;
pub mod models;
pub mod modules;
pub mod proxy; // TMDB proxy service
pub mod utils;

use modules::logger;
use tracing::{info, warn};

/// Load configuration, start the proxy and serve until Ctrl-C
pub async fn run() -> error::AppResult<()> {
    let config = modules::config::load_app_config()?;

    // Initialize logger
    logger::init_logger(&config);

    let proxy_config = config.proxy;
    if proxy_config.effective_api_key().is_none() {
        warn!("TMDB_API_KEY is not set: every proxied request will fail with 500");
    }

    let state = proxy::AppState::from_config(&proxy_config)?;
    info!("Forwarding /api/tmdb to {}", state.upstream.base_url());

    let app = proxy::build_router(state, &proxy_config);
    let (server, handle) = proxy::AxumServer::start(
        proxy_config.get_bind_address(),
        proxy_config.port,
        app,
    )
    .await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    server.stop();
    if let Err(e) = handle.await {
        warn!("Server task ended abnormally: {}", e);
    }

    Ok(())
}
