// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Playlist;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of playlists returned by the recent-playlists endpoint.
const RECENT_PLAYLISTS: usize = 5;

/// API routes (require an authenticated session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user", get(get_user))
        .route("/api/playlists", get(get_playlists))
        .route("/api/playlists/recent", get(get_recent_playlists))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response. Never carries credentials.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub spotify_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

/// Get current user profile.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(UserResponse {
        id: profile.id,
        spotify_id: profile.spotify_id,
        display_name: profile.display_name,
        email: profile.email,
        image_url: profile.image_url,
    }))
}

// ─── Playlist History ────────────────────────────────────────

/// All playlists saved by the current user, oldest first.
async fn get_playlists(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Playlist>>> {
    let playlists = state.db.get_playlists_for_user(user.user_id).await?;
    Ok(Json(playlists))
}

/// The most recently saved playlists, newest first.
async fn get_recent_playlists(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Playlist>>> {
    let playlists = state
        .db
        .get_recent_playlists_for_user(user.user_id, RECENT_PLAYLISTS)
        .await?;
    Ok(Json(playlists))
}
