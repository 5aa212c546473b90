// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.
//!
//! The session cookie value is `<session id>.<hex HMAC-SHA256(session id)>`.
//! The signature is checked before the session store is consulted, so a
//! guessed or tampered ID never reaches the store.

use crate::config::Config;
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "spotgen_session";

/// Authenticated user attached to the request by [`require_auth`].
///
/// Handlers read it with `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub session_id: String,
}

/// Middleware that requires a live, correctly signed session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let value = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
            .ok_or(AppError::Unauthorized)?,
    };

    let session_id = verify_session_value(&value, &state.config.session_signing_key)
        .ok_or(AppError::Unauthorized)?;

    let user_id = state
        .sessions
        .get(session_id)
        .ok_or(AppError::Unauthorized)?;

    let auth_user = AuthUser {
        user_id,
        session_id: session_id.to_string(),
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Sign a session ID for use as a cookie or bearer value.
pub fn sign_session_id(session_id: &str, key: &[u8]) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(session_id.as_bytes());
    Ok(format!(
        "{}.{}",
        session_id,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Check a signed session value and return the session ID it carries.
pub fn verify_session_value<'a>(value: &'a str, key: &[u8]) -> Option<&'a str> {
    let (session_id, signature_hex) = value.rsplit_once('.')?;
    if session_id.is_empty() {
        return None;
    }
    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(session_id.as_bytes());
    let expected = mac.finalize().into_bytes();

    if bool::from(expected.as_slice().ct_eq(&signature)) {
        Some(session_id)
    } else {
        tracing::warn!("Session signature mismatch");
        None
    }
}

/// Session ID from a request's cookie, if present and correctly signed.
pub fn session_id_from_jar(jar: &CookieJar, key: &[u8]) -> Option<String> {
    let cookie = jar.get(SESSION_COOKIE)?;
    verify_session_value(cookie.value(), key).map(str::to_string)
}

/// Session cookie carrying a signed value.
pub fn session_cookie(config: &Config, value: String, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Cookie with the same attributes as [`session_cookie`], for removal.
pub fn session_removal_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .build()
}
