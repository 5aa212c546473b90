// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The session secret is never used directly: separate keys for the
//! session cookie and the OAuth `state` parameter are derived from it
//! with HKDF-SHA256 when the configuration is loaded.

use hkdf::Hkdf;
use sha2::Sha256;
use std::env;

const DEFAULT_PUBLIC_URL: &str = "http://localhost:5000";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

const SESSION_KEY_INFO: &[u8] = b"spotgen session cookie v1";
const OAUTH_STATE_KEY_INFO: &[u8] = b"spotgen oauth state v1";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Spotify OAuth client ID (public)
    pub spotify_client_id: String,
    /// Externally visible base URL of this server (used for the OAuth redirect URI)
    pub public_url: String,
    /// Server port
    pub port: u16,
    /// Spotify Web API base URL
    pub spotify_api_base_url: String,
    /// Spotify accounts service base URL (authorize + token endpoints)
    pub spotify_accounts_base_url: String,

    // --- Secrets ---
    /// Spotify OAuth client secret
    pub spotify_client_secret: String,
    /// HMAC key for signing session cookies (derived)
    pub session_signing_key: Vec<u8>,
    /// HMAC key for signing the OAuth state parameter (derived)
    pub oauth_state_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;

        Self::build(
            env::var("SPOTIFY_CLIENT_ID").map_err(|_| ConfigError::Missing("SPOTIFY_CLIENT_ID"))?,
            env::var("SPOTIFY_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SPOTIFY_CLIENT_SECRET"))?,
            session_secret.trim().as_bytes(),
            env::var("PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string()),
            env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            env::var("SPOTIFY_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            env::var("SPOTIFY_ACCOUNTS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ACCOUNTS_BASE_URL.to_string()),
        )
    }

    /// Configuration for tests, pointing at the real Spotify hosts.
    ///
    /// Tests that talk to a mock upstream override the two base URLs.
    pub fn test_default() -> Self {
        Self::build(
            "test_client_id".to_string(),
            "test_client_secret".to_string(),
            b"test_session_secret_32_bytes_min!",
            DEFAULT_PUBLIC_URL.to_string(),
            DEFAULT_PORT,
            DEFAULT_API_BASE_URL.to_string(),
            DEFAULT_ACCOUNTS_BASE_URL.to_string(),
        )
        .expect("test configuration is valid")
    }

    fn build(
        spotify_client_id: String,
        spotify_client_secret: String,
        session_secret: &[u8],
        public_url: String,
        port: u16,
        spotify_api_base_url: String,
        spotify_accounts_base_url: String,
    ) -> Result<Self, ConfigError> {
        if session_secret.is_empty() {
            return Err(ConfigError::Invalid("SESSION_SECRET must not be empty"));
        }

        Ok(Self {
            spotify_client_id,
            public_url,
            port,
            spotify_api_base_url: spotify_api_base_url.trim_end_matches('/').to_string(),
            spotify_accounts_base_url: spotify_accounts_base_url
                .trim_end_matches('/')
                .to_string(),
            spotify_client_secret,
            session_signing_key: derive_key(session_secret, SESSION_KEY_INFO)?,
            oauth_state_key: derive_key(session_secret, OAUTH_STATE_KEY_INFO)?,
        })
    }

    /// Redirect URI registered with Spotify.
    pub fn redirect_uri(&self) -> String {
        format!("{}/callback", self.public_url)
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

/// Derive a 32-byte subkey from the session secret.
fn derive_key(secret: &[u8], info: &[u8]) -> Result<Vec<u8>, ConfigError> {
    let hk = Hkdf::<Sha256>::new(None, secret);
    let mut okm = [0u8; 32];
    hk.expand(info, &mut okm)
        .map_err(|_| ConfigError::Invalid("key derivation failed"))?;
    Ok(okm.to_vec())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
