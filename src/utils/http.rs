use reqwest::{Client, Proxy};

pub const USER_AGENT: &str = concat!("tmdb-proxy/", env!("CARGO_PKG_VERSION"));

/// Create an HTTP client with the given outbound proxy and timeout.
///
/// `timeout_secs = None` leaves reqwest's own defaults in place.
pub fn create_client_with_proxy(
    timeout_secs: Option<u64>,
    proxy_config: Option<&crate::proxy::config::UpstreamProxyConfig>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(USER_AGENT);

    if let Some(secs) = timeout_secs {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }

    // Only the configured proxy is used, never *_PROXY environment variables
    builder = builder.no_proxy();

    if let Some(config) = proxy_config {
        if config.enabled && !config.url.is_empty() {
            match Proxy::all(&config.url) {
                Ok(proxy) => {
                    builder = builder.proxy(proxy);
                    tracing::info!("HTTP client upstream proxy enabled: {}", config.url);
                }
                Err(e) => {
                    tracing::error!("Invalid proxy address: {}, error: {}", config.url, e);
                }
            }
        }
    }

    builder.build()
}
