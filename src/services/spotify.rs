// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spotify Web API client and token lifecycle management.
//!
//! Handles:
//! - Authorization code and refresh token exchanges
//! - Typed wrappers for the endpoints the generators combine
//! - Pass-through wrappers for the endpoints proxied unchanged
//! - Token refresh when expired, serialized per user

use crate::config::Config;
use crate::error::AppError;
use crate::models::spotify::{
    ArtistList, CreatedPlaylist, GenreSeeds, Paging, PlayHistoryItem, SavedTrack,
    SpotifyProfile, TokenResponse, TrackList,
};
use crate::models::{Artist, Track};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Spotify accepts at most this many URIs per add-tracks request.
const ADD_TRACKS_BATCH: usize = 100;

/// Market used for top-track lookups.
const MARKET: &str = "US";

/// Spotify API client.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base_url: String,
    accounts_base_url: String,
    client_id: String,
    client_secret: String,
}

impl SpotifyClient {
    /// Create a new Spotify client with OAuth credentials.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: config.spotify_api_base_url.clone(),
            accounts_base_url: config.spotify_accounts_base_url.clone(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
        }
    }

    /// URL of the accounts service authorize page.
    pub fn authorize_url(&self, redirect_uri: &str, scopes: &str, state: &str) -> String {
        format!(
            "{}/authorize?\
             response_type=code&\
             client_id={}&\
             scope={}&\
             redirect_uri={}&\
             state={}",
            self.accounts_base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(scopes),
            urlencoding::encode(redirect_uri),
            state
        )
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if status.as_u16() == 400 || status.as_u16() == 401 {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Spotify token exchange rejected");
            return Err(AppError::UpstreamAuth(format!(
                "Token exchange rejected with status {}",
                status
            )));
        }

        self.check_response_json(response).await
    }

    // ─── Profile & library ───────────────────────────────────────────────────

    /// Get the current user's profile.
    pub async fn get_me(&self, access_token: &str) -> Result<SpotifyProfile, AppError> {
        self.get_json("/me", access_token, &[]).await
    }

    /// Recently played tracks (history items).
    pub async fn get_recently_played(
        &self,
        access_token: &str,
        limit: u32,
    ) -> Result<Vec<PlayHistoryItem>, AppError> {
        let page: Paging<PlayHistoryItem> = self
            .get_json(
                "/me/player/recently-played",
                access_token,
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(page.items)
    }

    /// User's top tracks. Spotify's default range applies when `time_range` is `None`.
    pub async fn get_top_tracks(
        &self,
        access_token: &str,
        time_range: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Track>, AppError> {
        let page: Paging<Track> = self
            .get_json(
                "/me/top/tracks",
                access_token,
                &top_query(time_range, limit),
            )
            .await?;
        Ok(page.items)
    }

    /// User's top artists.
    pub async fn get_top_artists(
        &self,
        access_token: &str,
        time_range: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Artist>, AppError> {
        let page: Paging<Artist> = self
            .get_json(
                "/me/top/artists",
                access_token,
                &top_query(time_range, limit),
            )
            .await?;
        Ok(page.items)
    }

    /// User's saved (liked) tracks.
    pub async fn get_saved_tracks(
        &self,
        access_token: &str,
        limit: u32,
    ) -> Result<Vec<Track>, AppError> {
        let page: Paging<SavedTrack> = self
            .get_json("/me/tracks", access_token, &[("limit", limit.to_string())])
            .await?;
        Ok(page.items.into_iter().map(|item| item.track).collect())
    }

    // ─── Catalog ─────────────────────────────────────────────────────────────

    /// Artist details (passed through).
    pub async fn get_artist(&self, access_token: &str, artist_id: &str) -> Result<Value, AppError> {
        let path = format!("/artists/{}", urlencoding::encode(artist_id));
        self.get_json(&path, access_token, &[]).await
    }

    /// An artist's top tracks in the default market.
    pub async fn get_artist_top_tracks(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<TrackList, AppError> {
        let path = format!("/artists/{}/top-tracks", urlencoding::encode(artist_id));
        self.get_json(&path, access_token, &[("market", MARKET.to_string())])
            .await
    }

    /// An artist's albums (passed through).
    pub async fn get_artist_albums(
        &self,
        access_token: &str,
        artist_id: &str,
        include_groups: &str,
        limit: u32,
    ) -> Result<Value, AppError> {
        let path = format!("/artists/{}/albums", urlencoding::encode(artist_id));
        self.get_json(
            &path,
            access_token,
            &[
                ("include_groups", include_groups.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Artists related to an artist.
    pub async fn get_related_artists(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<Vec<Artist>, AppError> {
        let path = format!("/artists/{}/related-artists", urlencoding::encode(artist_id));
        let list: ArtistList = self.get_json(&path, access_token, &[]).await?;
        Ok(list.artists)
    }

    /// Related artists, passed through unchanged.
    pub async fn get_related_artists_raw(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<Value, AppError> {
        let path = format!("/artists/{}/related-artists", urlencoding::encode(artist_id));
        self.get_json(&path, access_token, &[]).await
    }

    /// An album's tracks (passed through).
    pub async fn get_album_tracks(
        &self,
        access_token: &str,
        album_id: &str,
        limit: u32,
    ) -> Result<Value, AppError> {
        let path = format!("/albums/{}/tracks", urlencoding::encode(album_id));
        self.get_json(&path, access_token, &[("limit", limit.to_string())])
            .await
    }

    /// Catalog search (passed through).
    pub async fn search(
        &self,
        access_token: &str,
        query: &str,
        types: &str,
        limit: u32,
    ) -> Result<Value, AppError> {
        self.get_json(
            "/search",
            access_token,
            &[
                ("q", query.to_string()),
                ("type", types.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Genres accepted as recommendation seeds.
    pub async fn get_available_genre_seeds(
        &self,
        access_token: &str,
    ) -> Result<Vec<String>, AppError> {
        let seeds: GenreSeeds = self
            .get_json("/recommendations/available-genre-seeds", access_token, &[])
            .await?;
        Ok(seeds.genres)
    }

    /// Seed-based recommendations.
    pub async fn get_recommendations(
        &self,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<TrackList, AppError> {
        self.get_json("/recommendations", access_token, query).await
    }

    // ─── Playlists ───────────────────────────────────────────────────────────

    /// Create a public playlist owned by `spotify_user_id`.
    pub async fn create_playlist(
        &self,
        access_token: &str,
        spotify_user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist, AppError> {
        let url = format!(
            "{}/users/{}/playlists",
            self.api_base_url,
            urlencoding::encode(spotify_user_id)
        );

        let body = serde_json::json!({
            "name": name,
            "description": description,
            "public": true
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Append tracks to a playlist, in batches Spotify accepts.
    pub async fn add_tracks_to_playlist(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), AppError> {
        let url = format!(
            "{}/playlists/{}/tracks",
            self.api_base_url,
            urlencoding::encode(playlist_id)
        );

        for batch in uris.chunks(ADD_TRACKS_BATCH) {
            let response = self
                .http
                .post(&url)
                .bearer_auth(access_token)
                .json(&serde_json::json!({ "uris": batch }))
                .send()
                .await
                .map_err(|e| AppError::Upstream(e.to_string()))?;

            self.check_response(response).await?;
        }

        Ok(())
    }

    /// Remove a playlist from the user's library.
    ///
    /// Spotify has no hard delete; unfollowing your own playlist is how
    /// its clients delete one.
    pub async fn unfollow_playlist(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<(), AppError> {
        let url = format!(
            "{}/playlists/{}/followers",
            self.api_base_url,
            urlencoding::encode(playlist_id)
        );

        let response = self
            .http
            .delete(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        self.check_response(response).await
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(format!("{}{}", self.api_base_url, path))
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::status_error(response).await)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("JSON parse error: {}", e)))
    }

    async fn status_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            429 => {
                tracing::warn!("Spotify rate limit hit (429)");
                AppError::Upstream(AppError::SPOTIFY_RATE_LIMIT.to_string())
            }
            401 => AppError::UpstreamAuth(format!("HTTP {}: {}", status, body)),
            _ => AppError::Upstream(format!("HTTP {}: {}", status, body)),
        }
    }
}

fn top_query(time_range: Option<&str>, limit: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", limit.to_string())];
    if let Some(range) = time_range {
        query.push(("time_range", range.to_string()));
    }
    query
}

// ─────────────────────────────────────────────────────────────────────────────
// SpotifyService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::Store;
use crate::models::spotify::first_image_url;
use crate::models::{NewUser, User, UserTokens};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared refresh locks type for use in AppState.
pub type RefreshLocks = Arc<DashMap<u64, Arc<Mutex<()>>>>;

/// High-level Spotify service that manages the token lifecycle.
///
/// Every outbound call made on behalf of a user goes through
/// [`SpotifyService::get_valid_access_token`] first.
#[derive(Clone)]
pub struct SpotifyService {
    client: SpotifyClient,
    db: Arc<dyn Store>,
    /// Per-user mutex to serialize token refresh operations.
    refresh_locks: RefreshLocks,
}

impl SpotifyService {
    pub fn new(client: SpotifyClient, db: Arc<dyn Store>, refresh_locks: RefreshLocks) -> Self {
        Self {
            client,
            db,
            refresh_locks,
        }
    }

    /// The underlying API client.
    pub fn client(&self) -> &SpotifyClient {
        &self.client
    }

    /// Number of users with a refresh lock entry.
    pub fn refresh_lock_count(&self) -> usize {
        self.refresh_locks.len()
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a valid (non-expired) access token for the given user.
    ///
    /// A token whose expiry is still ahead is returned as stored, without
    /// any network call. Otherwise the refresh token is exchanged under a
    /// per-user lock, so concurrent callers wait for one exchange and then
    /// reuse its result.
    pub async fn get_valid_access_token(&self, user_id: u64) -> Result<String, AppError> {
        let user = self.load_user(user_id).await?;
        if user.tokens.is_valid_at(Utc::now()) {
            return Ok(user.tokens.access_token);
        }

        let lock = self
            .refresh_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            self.refresh_locked(user_id).await
        };

        // Drop the lock entry unless another caller is holding or waiting on it.
        self.refresh_locks
            .remove_if(&user_id, |_, entry| Arc::strong_count(entry) <= 2);

        result
    }

    /// Refresh with the user's refresh lock held.
    async fn refresh_locked(&self, user_id: u64) -> Result<String, AppError> {
        // Another task may have refreshed while we were waiting.
        let user = self.load_user(user_id).await?;
        if user.tokens.is_valid_at(Utc::now()) {
            return Ok(user.tokens.access_token);
        }

        tracing::info!(user_id, "Access token expired, refreshing");

        let refreshed = self
            .client
            .refresh_token(&user.tokens.refresh_token)
            .await
            .inspect_err(|e| {
                if e.is_upstream_auth_error() {
                    tracing::warn!(user_id, error = %e, "Refresh token rejected, user must log in again");
                } else {
                    tracing::warn!(user_id, error = %e, "Token refresh failed");
                }
            })?;

        let tokens = UserTokens {
            access_token: refreshed.access_token,
            refresh_token: refreshed
                .refresh_token
                .unwrap_or(user.tokens.refresh_token),
            expires_at: expiry_from_now(refreshed.expires_in)?,
        };

        self.db
            .update_user_tokens(user_id, &tokens)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;

        tracing::info!(user_id, expires_at = %tokens.expires_at, "Token refreshed");
        Ok(tokens.access_token)
    }

    async fn load_user(&self, user_id: u64) -> Result<User, AppError> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }

    // ─── OAuth Callback Handling ─────────────────────────────────────────────

    /// Handle OAuth callback: exchange code for tokens, fetch the profile,
    /// and create or update the user.
    pub async fn handle_oauth_callback(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<User, AppError> {
        let token_response = self.client.exchange_code(code, redirect_uri).await?;

        let refresh_token = token_response.refresh_token.ok_or_else(|| {
            AppError::Upstream("Token exchange returned no refresh token".to_string())
        })?;

        let profile = self.client.get_me(&token_response.access_token).await?;

        let user = self
            .db
            .upsert_user(NewUser {
                spotify_id: profile.id,
                display_name: profile.display_name,
                email: profile.email,
                image_url: first_image_url(profile.images.as_deref()),
                tokens: UserTokens {
                    access_token: token_response.access_token,
                    refresh_token,
                    expires_at: expiry_from_now(token_response.expires_in)?,
                },
            })
            .await?;

        tracing::info!(
            user_id = user.id,
            spotify_id = %user.spotify_id,
            "OAuth callback handled, user stored"
        );

        Ok(user)
    }
}

/// Expiry instant for a token that lives `expires_in` seconds from now.
fn expiry_from_now(expires_in: i64) -> Result<DateTime<Utc>, AppError> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| {
            tracing::warn!(expires_in, "Token lifetime out of range");
            AppError::Upstream("invalid expires_in".to_string())
        })
}
