// Request logging middleware
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log every inbound request and the status it ended with
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    tracing::info!("Request: {} {}", method, uri);

    let started = Instant::now();
    let response = next.run(request).await;

    tracing::info!(
        "Response: {} {} -> {} ({} ms)",
        method,
        uri.path(),
        response.status().as_u16(),
        started.elapsed().as_millis()
    );

    response
}
