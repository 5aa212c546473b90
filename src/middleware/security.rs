// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Add security headers to all responses.
///
/// API responses carry per-user data and are never cached. HSTS is only
/// sent when the server is reached over https.
pub async fn add_security_headers(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let is_api = req.uri().path().starts_with("/api/");
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    if state.config.secure_cookies() {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
    if is_api {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::MemoryStore;
    use axum::body::Body;
    use axum::{routing::get, Router};
    use tower::ServiceExt; // for oneshot

    fn app(config: Config) -> Router {
        let state = Arc::new(AppState::new(config, Arc::new(MemoryStore::default())));
        Router::new()
            .route("/", get(|| async { "Hello" }))
            .route("/api/thing", get(|| async { "data" }))
            .layer(axum::middleware::from_fn_with_state(
                state,
                add_security_headers,
            ))
    }

    #[tokio::test]
    async fn test_security_headers() {
        let response = app(Config::test_default())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
        assert!(headers.get("Strict-Transport-Security").is_none());
        assert!(headers.get("Cache-Control").is_none());
    }

    #[tokio::test]
    async fn test_api_responses_not_cached_and_hsts_on_https() {
        let mut config = Config::test_default();
        config.public_url = "https://spotgen.example.com".to_string();

        let response = app(config)
            .oneshot(
                Request::builder()
                    .uri("/api/thing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("Cache-Control").unwrap(), "no-store");
        assert_eq!(
            headers.get("Strict-Transport-Security").unwrap(),
            "max-age=31536000; includeSubDomains"
        );
    }
}
