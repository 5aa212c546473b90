// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spotify proxy and playlist generator routes.
//!
//! Every handler first obtains a valid access token for the session's
//! user, refreshing it if needed, and then talks to Spotify with it.

use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::models::recommendation::{MoodMixResponse, TracksResponse};
use crate::models::spotify::{GenreSeeds, TrackList};
use crate::models::{
    ArtistMixRequest, GenreMixRequest, MixResponse, MoodMixRequest, Playlist,
    SavePlaylistRequest,
};
use crate::services::{generator, playlist};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Largest page size Spotify accepts on the proxied list endpoints.
const MAX_PAGE_LIMIT: u32 = 50;
const DEFAULT_ALBUM_GROUPS: &str = "album,single";
const DEFAULT_SEARCH_TYPES: &str = "track,artist,album";
const DEFAULT_SEARCH_LIMIT: u32 = 20;
const LEGACY_ARTIST_SEARCH_LIMIT: u32 = 10;

/// Spotify routes (require an authenticated session).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog proxies
        .route("/api/spotify/artists/{id}", get(get_artist))
        .route("/api/spotify/artists/{id}/top-tracks", get(get_artist_top_tracks))
        .route("/api/spotify/artists/{id}/albums", get(get_artist_albums))
        .route(
            "/api/spotify/artists/{id}/related-artists",
            get(get_related_artists),
        )
        .route("/api/spotify/albums/{id}/tracks", get(get_album_tracks))
        .route(
            "/api/spotify/me/played-tracks/artist/{id}",
            get(get_played_tracks),
        )
        .route("/api/spotify/search", get(search))
        .route("/api/spotify/search/artists", get(search_artists))
        .route("/api/spotify/genres", get(get_genres))
        // Generators
        .route("/api/spotify/recommendations/genre", post(genre_mix))
        .route("/api/spotify/recommendations/artist", post(artist_mix))
        .route("/api/spotify/recommendations/mood", post(mood_mix))
        .route("/api/spotify/recommendations/daily", get(daily_mix))
        .route("/api/spotify/recommendations/must-listen", get(must_listen_mix))
        // Persistence
        .route("/api/spotify/playlists", post(save_playlist))
}

async fn access_token(state: &AppState, user: &AuthUser) -> Result<String> {
    state
        .spotify_service
        .get_valid_access_token(user.user_id)
        .await
}

/// Parse a numeric query value, falling back to `default` when it is
/// missing or not a positive number, and capping it at the API maximum.
fn parse_limit(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
        .min(MAX_PAGE_LIMIT)
}

// ─── Catalog ─────────────────────────────────────────────────

async fn get_artist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let token = access_token(&state, &user).await?;
    let artist = state.spotify_service.client().get_artist(&token, &id).await?;
    Ok(Json(artist))
}

async fn get_artist_top_tracks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<TrackList>> {
    let token = access_token(&state, &user).await?;
    let tracks = state
        .spotify_service
        .client()
        .get_artist_top_tracks(&token, &id)
        .await?;
    Ok(Json(tracks))
}

#[derive(Debug, Deserialize)]
pub struct AlbumsQuery {
    include_groups: Option<String>,
    limit: Option<String>,
}

async fn get_artist_albums(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(params): Query<AlbumsQuery>,
) -> Result<Json<Value>> {
    let include_groups = params
        .include_groups
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .unwrap_or(DEFAULT_ALBUM_GROUPS);
    let limit = parse_limit(params.limit.as_deref(), MAX_PAGE_LIMIT);

    let token = access_token(&state, &user).await?;
    let albums = state
        .spotify_service
        .client()
        .get_artist_albums(&token, &id, include_groups, limit)
        .await?;
    Ok(Json(albums))
}

async fn get_related_artists(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let token = access_token(&state, &user).await?;
    let related = state
        .spotify_service
        .client()
        .get_related_artists_raw(&token, &id)
        .await?;
    Ok(Json(related))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<String>,
}

async fn get_album_tracks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Value>> {
    let limit = parse_limit(params.limit.as_deref(), MAX_PAGE_LIMIT);

    let token = access_token(&state, &user).await?;
    let tracks = state
        .spotify_service
        .client()
        .get_album_tracks(&token, &id, limit)
        .await?;
    Ok(Json(tracks))
}

/// IDs of the artist's tracks in the user's recent history or top tracks.
async fn get_played_tracks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>> {
    let token = access_token(&state, &user).await?;
    let ids =
        generator::played_tracks_for_artist(state.spotify_service.client(), &token, &id).await?;
    Ok(Json(ids))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    #[serde(rename = "type")]
    types: Option<String>,
    limit: Option<String>,
}

impl SearchQuery {
    fn query(&self) -> Result<&str> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::Validation("Search query is required".to_string()))
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let q = params.query()?;
    let types = params
        .types
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_SEARCH_TYPES);
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_SEARCH_LIMIT);

    let token = access_token(&state, &user).await?;
    let results = state
        .spotify_service
        .client()
        .search(&token, q, types, limit)
        .await?;
    Ok(Json(results))
}

/// Older artist-only search; returns just the `artists` page.
async fn search_artists(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let q = params.query()?;

    let token = access_token(&state, &user).await?;
    let mut results = state
        .spotify_service
        .client()
        .search(&token, q, "artist", LEGACY_ARTIST_SEARCH_LIMIT)
        .await?;
    let artists = results
        .get_mut("artists")
        .map(Value::take)
        .unwrap_or(Value::Null);
    Ok(Json(artists))
}

async fn get_genres(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<GenreSeeds>> {
    let token = access_token(&state, &user).await?;
    let genres = state
        .spotify_service
        .client()
        .get_available_genre_seeds(&token)
        .await?;
    Ok(Json(GenreSeeds { genres }))
}

// ─── Generators ──────────────────────────────────────────────

async fn genre_mix(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<GenreMixRequest>,
) -> Result<Json<TrackList>> {
    let token = access_token(&state, &user).await?;
    let mix = generator::genre_mix(state.spotify_service.client(), &token, &request).await?;
    Ok(Json(mix))
}

async fn artist_mix(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<ArtistMixRequest>,
) -> Result<Json<TracksResponse>> {
    let token = access_token(&state, &user).await?;
    let mix = generator::artist_mix(state.spotify_service.client(), &token, &request).await?;
    Ok(Json(mix))
}

async fn mood_mix(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<MoodMixRequest>,
) -> Result<Json<MoodMixResponse>> {
    let token = access_token(&state, &user).await?;
    let mix = generator::mood_mix(state.spotify_service.client(), &token, &request).await?;
    Ok(Json(mix))
}

async fn daily_mix(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MixResponse>> {
    let token = access_token(&state, &user).await?;
    let mix = generator::daily_mix(state.spotify_service.client(), &token).await?;
    Ok(Json(mix))
}

async fn must_listen_mix(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MixResponse>> {
    let token = access_token(&state, &user).await?;
    let mix = generator::must_listen_mix(state.spotify_service.client(), &token).await?;
    Ok(Json(mix))
}

// ─── Persistence ─────────────────────────────────────────────

/// Save a generated playlist to the user's Spotify library and record it.
async fn save_playlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<SavePlaylistRequest>,
) -> Result<Json<Playlist>> {
    let owner = state
        .db
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    let token = access_token(&state, &user).await?;
    let saved = playlist::save_playlist(
        state.spotify_service.client(),
        state.db.as_ref(),
        &owner,
        &token,
        request,
    )
    .await?;
    Ok(Json(saved))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None, 20), 20);
        assert_eq!(parse_limit(Some("10"), 20), 10);
        assert_eq!(parse_limit(Some("abc"), 20), 20);
        assert_eq!(parse_limit(Some("0"), 20), 20);
        assert_eq!(parse_limit(Some("-3"), 20), 20);
        assert_eq!(parse_limit(Some("500"), 20), MAX_PAGE_LIMIT);
    }
}
