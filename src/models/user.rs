//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User record kept by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal user ID (assigned by the store)
    pub id: u64,
    /// Spotify account ID
    pub spotify_id: String,
    /// Display name (may be None if not set on Spotify)
    pub display_name: Option<String>,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Avatar URL (first profile image)
    pub image_url: Option<String>,
    /// Current Spotify credentials
    pub tokens: UserTokens,
}

/// Fields needed to create (or re-authenticate) a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub spotify_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub tokens: UserTokens,
}

/// User's Spotify OAuth credentials.
///
/// Exactly one triple exists per user; a refresh replaces all three fields.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token stops being valid
    pub expires_at: DateTime<Utc>,
}

impl UserTokens {
    /// Whether the access token may still be used at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl fmt::Debug for UserTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
