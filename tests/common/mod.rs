// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use spotgen::config::Config;
use spotgen::db::MemoryStore;
use spotgen::middleware::auth::{sign_session_id, SESSION_COOKIE};
use spotgen::models::{NewUser, User, UserTokens};
use spotgen::routes::create_router;
use spotgen::AppState;
use std::sync::Arc;
use wiremock::MockServer;

/// Create a test app with offline dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

/// Create a test app with a custom public URL.
#[allow(dead_code)]
pub fn create_test_app_with_public_url(public_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.public_url = public_url.to_string();
    create_test_app_with_config(config)
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, Arc::new(MemoryStore::default())));
    (create_router(state.clone()), state)
}

/// Create a test app whose Spotify API and accounts service are a mock server.
#[allow(dead_code)]
pub async fn create_mock_app() -> (axum::Router, Arc<AppState>, MockServer) {
    let server = MockServer::start().await;

    let mut config = Config::test_default();
    config.spotify_api_base_url = format!("{}/v1", server.uri());
    config.spotify_accounts_base_url = server.uri();

    let (app, state) = create_test_app_with_config(config);
    (app, state, server)
}

/// Store a user whose access token expires at `expires_at`.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, spotify_id: &str, expires_at: DateTime<Utc>) -> User {
    state
        .db
        .upsert_user(NewUser {
            spotify_id: spotify_id.to_string(),
            display_name: Some(format!("User {}", spotify_id)),
            email: Some(format!("{}@example.com", spotify_id)),
            image_url: None,
            tokens: UserTokens {
                access_token: format!("access-{}", spotify_id),
                refresh_token: format!("refresh-{}", spotify_id),
                expires_at,
            },
        })
        .await
        .expect("seed user")
}

/// Store a user with a token valid for another hour.
#[allow(dead_code)]
pub async fn seed_valid_user(state: &AppState, spotify_id: &str) -> User {
    seed_user(state, spotify_id, Utc::now() + Duration::hours(1)).await
}

/// Start a session for a user and return the signed session value.
#[allow(dead_code)]
pub fn session_value(state: &AppState, user_id: u64) -> String {
    let session_id = state.sessions.create(user_id).expect("create session");
    sign_session_id(&session_id, &state.config.session_signing_key).expect("sign session")
}

/// `Cookie` header value for a new session of `user_id`.
#[allow(dead_code)]
pub fn session_cookie(state: &AppState, user_id: u64) -> String {
    format!("{}={}", SESSION_COOKIE, session_value(state, user_id))
}

/// Authenticated GET request.
#[allow(dead_code)]
pub fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Authenticated POST request with a JSON body.
#[allow(dead_code)]
pub fn post_json(uri: &str, cookie: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A track object as Spotify returns it.
#[allow(dead_code)]
pub fn track_json(id: &str, artist_id: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": format!("Track {}", id),
        "uri": format!("spotify:track:{}", id),
        "duration_ms": 180_000,
        "artists": [{ "id": artist_id, "name": format!("Artist {}", artist_id) }]
    })
}

/// IDs of the tracks in a `tracks` array.
#[allow(dead_code)]
pub fn track_ids(body: &Value) -> Vec<String> {
    body["tracks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}
