// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spotify OAuth authentication routes.

use axum::{
    extract::{Query, RawQuery, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    session_cookie, session_id_from_jar, session_removal_cookie, sign_session_id,
};
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Permissions requested from the user.
pub const SPOTIFY_SCOPES: &str = "user-read-private user-read-email \
    playlist-modify-public playlist-modify-private user-top-read \
    user-read-recently-played user-library-read";

/// How long a login attempt may take before its state is refused.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", get(login))
        .route("/callback", get(callback_alias))
        .route("/api/auth/callback", get(auth_callback))
        .route("/api/auth/logout", get(logout).post(logout))
}

/// Start OAuth flow - redirect to Spotify authorization.
async fn login(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let oauth_state = create_state(&state.config.oauth_state_key, now_millis()?)?;
    let redirect_uri = state.config.redirect_uri();

    let auth_url = state.spotify_service.client().authorize_url(
        &redirect_uri,
        SPOTIFY_SCOPES,
        &oauth_state,
    );

    tracing::info!(
        redirect_uri = %redirect_uri,
        "Starting OAuth flow, redirecting to Spotify"
    );

    Ok(Redirect::temporary(&auth_url))
}

/// `/callback` is the registered redirect URI; hand its query to the real handler.
async fn callback_alias(RawQuery(query): RawQuery) -> Redirect {
    let target = match query {
        Some(q) => format!("/api/auth/callback?{}", q),
        None => "/api/auth/callback".to_string(),
    };
    Redirect::temporary(&target)
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, create session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    // Check for OAuth errors
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Spotify");
        let redirect = format!("/?error={}", urlencoding::encode(&error));
        return Ok((jar, Redirect::temporary(&redirect)));
    }

    let oauth_state = params
        .state
        .ok_or_else(|| AppError::Validation("OAuth state not provided".to_string()))?;
    if !verify_state(&oauth_state, &state.config.oauth_state_key, now_millis()?) {
        return Err(AppError::Validation(
            "Invalid or expired OAuth state".to_string(),
        ));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::Validation("Authorization code not provided".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");

    let user = state
        .spotify_service
        .handle_oauth_callback(&code, &state.config.redirect_uri())
        .await?;

    let session_id = state.sessions.create(user.id)?;
    let value = sign_session_id(&session_id, &state.config.session_signing_key)?;

    tracing::info!(user_id = user.id, "Login successful, session created");

    let jar = jar.add(session_cookie(&state.config, value, state.sessions.ttl()));
    Ok((jar, Redirect::temporary("/")))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Logout - destroy the server-side session and clear the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    if let Some(session_id) = session_id_from_jar(&jar, &state.config.session_signing_key) {
        state.sessions.destroy(&session_id);
    }

    let jar = jar.remove(session_removal_cookie(&state.config));
    (
        jar,
        Json(LogoutResponse {
            message: "Logout successful".to_string(),
        }),
    )
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

fn state_signature(payload: &str, secret: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

/// Build a signed OAuth state: base64url("nonce_hex|timestamp_hex|signature_hex").
fn create_state(secret: &[u8], now_ms: u128) -> Result<String> {
    let mut nonce = [0u8; 16];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate OAuth nonce")))?;

    let payload = format!("{}|{:x}", hex::encode(nonce), now_ms);
    let signature = state_signature(&payload, secret)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("HMAC init failed")))?;

    let signed_state = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed_state.as_bytes()))
}

/// Verify the signature and age of an OAuth state parameter.
fn verify_state(state: &str, secret: &[u8], now_ms: u128) -> bool {
    let Some(state_str) = URL_SAFE_NO_PAD
        .decode(state)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return false;
    };

    // Format is "nonce_hex|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    let [nonce_hex, timestamp_hex, signature_hex] = parts[..] else {
        return false;
    };

    let payload = format!("{}|{}", nonce_hex, timestamp_hex);
    let (Some(expected), Ok(signature)) =
        (state_signature(&payload, secret), hex::decode(signature_hex))
    else {
        return false;
    };

    if !bool::from(expected.as_slice().ct_eq(&signature)) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    match u128::from_str_radix(timestamp_hex, 16) {
        Ok(issued_ms) if issued_ms <= now_ms && now_ms - issued_ms <= STATE_MAX_AGE_MS => true,
        _ => {
            tracing::warn!("OAuth state expired");
            false
        }
    }
}
