use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Startup and configuration errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

// Implement alias for Result to simplify usage
pub type AppResult<T> = Result<T, AppError>;

/// Generic message returned for every failure the caller should not see details of
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// Per-request failures of the TMDB proxy handler.
///
/// Upstream non-2xx responses are not represented here: they are relayed to
/// the caller as-is.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("The TMDB API key is not configured on the server.")]
    MissingApiKey,

    #[error("The API endpoint is required.")]
    MissingEndpoint,

    #[error("Invalid API endpoint: {0}")]
    InvalidEndpoint(&'static str),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream returned a non-JSON body: {0}")]
    UpstreamBody(#[from] serde_json::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingEndpoint | ProxyError::InvalidEndpoint(_) => StatusCode::BAD_REQUEST,
            ProxyError::MissingApiKey
            | ProxyError::Upstream(_)
            | ProxyError::UpstreamBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller
    pub fn public_message(&self) -> String {
        match self {
            ProxyError::Upstream(_) | ProxyError::UpstreamBody(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::Upstream(_) | ProxyError::UpstreamBody(_) => {
                tracing::error!("Error calling the TMDB API: {}", self);
            }
            ProxyError::MissingApiKey => {
                tracing::error!("Rejecting request: {}", self);
            }
            ProxyError::MissingEndpoint | ProxyError::InvalidEndpoint(_) => {
                tracing::debug!("Rejecting request: {}", self);
            }
        }

        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}
