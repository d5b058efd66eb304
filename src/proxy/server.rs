use crate::error::{AppError, AppResult};
use crate::proxy::common::query::QueryDefaults;
use crate::proxy::config::ProxyConfig;
use crate::proxy::upstream::client::UpstreamClient;
use axum::{
    http::HeaderValue,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Axum application state
///
/// Built once at startup and never mutated, so handlers share it without locks.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured; every proxied request then fails with 500
    pub query_defaults: Option<Arc<QueryDefaults>>,
    pub cache_control: HeaderValue,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn from_config(config: &ProxyConfig) -> AppResult<Self> {
        let query_defaults = config.effective_api_key().map(|api_key| {
            Arc::new(QueryDefaults {
                api_key: api_key.to_string(),
                language: config.language.clone(),
                include_adult: config.include_adult,
            })
        });

        let cache_control = HeaderValue::from_str(&config.cache_control_value())
            .map_err(|e| AppError::Config(format!("Invalid Cache-Control value: {}", e)))?;

        Ok(Self {
            query_defaults,
            cache_control,
            upstream: Arc::new(UpstreamClient::new(config)?),
        })
    }
}

/// Build the application router
pub fn build_router(state: AppState, config: &ProxyConfig) -> Router {
    use crate::proxy::handlers;

    Router::new()
        .route("/api/tmdb", get(handlers::tmdb::handle_tmdb))
        .route("/healthz", get(health_check_handler))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            crate::proxy::middleware::request_logging_middleware,
        ))
        .layer(crate::proxy::middleware::cors_layer(&config.cors))
        .with_state(state)
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: SocketAddr,
}

impl AxumServer {
    /// Start Axum server
    pub async fn start(
        host: &str,
        port: u16,
        app: Router,
    ) -> AppResult<(Self, tokio::task::JoinHandle<()>)> {
        // Bind address
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind address {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        tracing::info!("TMDB proxy server started at http://{}", local_addr);

        // Create shutdown channel
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
            local_addr,
        };

        // Start server in new task
        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let service = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling finished or errored: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("TMDB proxy server stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Health check handler
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
    .into_response()
}
