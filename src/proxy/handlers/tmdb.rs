// TMDB Handler
use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::ProxyError;
use crate::proxy::common::endpoint::validate_endpoint;
use crate::proxy::common::query::{build_upstream_query, InboundQuery};
use crate::proxy::server::AppState;

/// Handle `GET /api/tmdb?endpoint=/discover/movie&page=2&...`
///
/// Injects the server-side API key and default parameters, calls TMDB and
/// relays its JSON body. Successful responses carry a shared-cache hint.
pub async fn handle_tmdb(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, ProxyError> {
    // 1. Server credential
    let defaults = state.query_defaults.as_ref().ok_or(ProxyError::MissingApiKey)?;

    // 2. Target sub-path
    let inbound = InboundQuery::parse(raw_query.as_deref());
    let endpoint = validate_endpoint(inbound.endpoint.as_deref())?;

    // 3. Upstream query: defaults first, caller pairs appended
    let query_string = build_upstream_query(defaults, &inbound.passthrough);

    // 4. Upstream call
    let reply = state.upstream.fetch(endpoint, &query_string).await?;

    // 5. Relay
    if !reply.status.is_success() {
        tracing::warn!(
            "TMDB returned {} for {} (relayed to caller)",
            reply.status.as_u16(),
            endpoint
        );
        return Ok((
            reply.status,
            [(header::CONTENT_TYPE, "application/json")],
            reply.body,
        )
            .into_response());
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (header::CACHE_CONTROL, state.cache_control.clone()),
        ],
        reply.body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use crate::error::INTERNAL_ERROR_MESSAGE;
    use crate::proxy::config::ProxyConfig;
    use crate::proxy::server::{build_router, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode, Uri},
        response::Response,
        Router,
    };
    use serde_json::Value;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    struct MockUpstream {
        base_url: String,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl MockUpstream {
        fn last_query(&self) -> String {
            let seen = self.seen.lock().unwrap();
            let uri: Uri = seen.last().expect("upstream was not called").parse().unwrap();
            uri.query().unwrap_or_default().to_string()
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    /// Stand-in for TMDB: records every request URI and answers by path
    async fn spawn_mock_upstream() -> MockUpstream {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();

        let app = Router::new().fallback(move |uri: Uri| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(uri.to_string());
                match uri.path() {
                    "/3/discover/movie" => (StatusCode::OK, r#"{"results":[]}"#),
                    "/3/movie/550" => (StatusCode::OK, r#"{"title":"Fight Club","id":550}"#),
                    "/3/not-json" => (StatusCode::OK, "<html>oops</html>"),
                    "/3/rate-limited" => (
                        StatusCode::TOO_MANY_REQUESTS,
                        r#"{"status_code":25,"status_message":"Your request count is over the allowed limit."}"#,
                    ),
                    _ => (StatusCode::NOT_FOUND, r#"{"status_message":"Not found"}"#),
                }
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpstream {
            base_url: format!("http://{}/3", addr),
            seen,
        }
    }

    fn app_for(base_url: &str, api_key: Option<&str>) -> Router {
        let config = ProxyConfig {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            ..ProxyConfig::default()
        };
        build_router(AppState::from_config(&config).unwrap(), &config)
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_400() {
        let upstream = spawn_mock_upstream().await;
        let app = app_for(&upstream.base_url, Some("k"));

        for uri in ["/api/tmdb", "/api/tmdb?page=2", "/api/tmdb?endpoint=&page=2"] {
            let response = get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
            assert!(json["error"].is_string());
        }
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_400_without_upstream_call() {
        let upstream = spawn_mock_upstream().await;
        let app = app_for(&upstream.base_url, Some("k"));

        for uri in [
            "/api/tmdb?endpoint=discover/movie",
            "/api/tmdb?endpoint=/../../etc",
            "/api/tmdb?endpoint=%2Fmovie%2F550%3Fapi_key%3Dother",
        ] {
            let response = get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_500() {
        let upstream = spawn_mock_upstream().await;

        for key in [None, Some(""), Some("   ")] {
            let app = app_for(&upstream.base_url, key);
            for uri in ["/api/tmdb?endpoint=/discover/movie", "/api/tmdb", "/api/tmdb?page=1"] {
                let response = get(app.clone(), uri).await;
                assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
                let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
                assert!(json["error"].is_string());
            }
        }
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_relays_body_with_cache_header() {
        let upstream = spawn_mock_upstream().await;
        let app = app_for(&upstream.base_url, Some("k"));

        let response = get(app, "/api/tmdb?endpoint=/discover/movie&page=2").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "s-maxage=3600, stale-while-revalidate"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_string(response).await, r#"{"results":[]}"#);
    }

    #[tokio::test]
    async fn test_success_body_is_byte_identical() {
        let upstream = spawn_mock_upstream().await;
        let app = app_for(&upstream.base_url, Some("k"));

        let response = get(app, "/api/tmdb?endpoint=/movie/550").await;
        assert_eq!(response.status(), StatusCode::OK);
        // key order must survive (no re-serialization)
        assert_eq!(body_string(response).await, r#"{"title":"Fight Club","id":550}"#);
    }

    #[tokio::test]
    async fn test_upstream_error_relayed_verbatim() {
        let upstream = spawn_mock_upstream().await;
        let app = app_for(&upstream.base_url, Some("k"));

        let response = get(app.clone(), "/api/tmdb?endpoint=/movie/0").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
        assert_eq!(body_string(response).await, r#"{"status_message":"Not found"}"#);

        let response = get(app, "/api/tmdb?endpoint=/rate-limited").await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_string(response).await,
            r#"{"status_code":25,"status_message":"Your request count is over the allowed limit."}"#
        );
    }

    #[tokio::test]
    async fn test_repeated_keys_forwarded_in_order() {
        let upstream = spawn_mock_upstream().await;
        let app = app_for(&upstream.base_url, Some("k"));

        let response = get(
            app,
            "/api/tmdb?with_genres=28&endpoint=/discover/movie&sort_by=popularity.desc&with_genres=12",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            upstream.last_query(),
            "api_key=k&language=pt-BR&include_adult=false&with_genres=28&sort_by=popularity.desc&with_genres=12"
        );
    }

    #[tokio::test]
    async fn test_defaults_always_present_and_caller_values_appended() {
        let upstream = spawn_mock_upstream().await;
        let app = app_for(&upstream.base_url, Some("k"));

        get(app.clone(), "/api/tmdb?endpoint=/discover/movie").await;
        assert_eq!(
            upstream.last_query(),
            "api_key=k&language=pt-BR&include_adult=false"
        );

        get(
            app,
            "/api/tmdb?endpoint=/discover/movie&language=en-US&include_adult=true",
        )
        .await;
        assert_eq!(
            upstream.last_query(),
            "api_key=k&language=pt-BR&include_adult=false&language=en-US&include_adult=true"
        );
    }

    #[tokio::test]
    async fn test_endpoint_not_forwarded() {
        let upstream = spawn_mock_upstream().await;
        let app = app_for(&upstream.base_url, Some("k"));

        get(app, "/api/tmdb?endpoint=/discover/movie&endpoint=/movie/550&page=1").await;
        let seen = upstream.seen.lock().unwrap().last().cloned().unwrap();
        assert!(seen.starts_with("/3/discover/movie?"));
        assert!(!seen.contains("endpoint"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_generic_500() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let app = app_for(&format!("http://{}/3", addr), Some("k"));
        let response = get(app, "/api/tmdb?endpoint=/discover/movie").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json, serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE }));
    }

    #[tokio::test]
    async fn test_non_json_upstream_is_generic_500() {
        let upstream = spawn_mock_upstream().await;
        let app = app_for(&upstream.base_url, Some("k"));

        let response = get(app, "/api/tmdb?endpoint=/not-json").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json, serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE }));
    }
}
