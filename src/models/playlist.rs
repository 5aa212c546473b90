// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Playlist records for playlists this service created on Spotify.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Which generator flow produced a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum PlaylistKind {
    Genre,
    Artist,
    Mood,
    MustListen,
    /// Older clients call this flow "replay".
    #[serde(alias = "replay")]
    Daily,
}

/// Stored playlist record. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: u64,
    /// Spotify playlist ID
    pub spotify_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Cover image URL, if Spotify returned one at creation time
    pub image_url: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: PlaylistKind,
    /// Generation parameters plus `totalTracks`
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub metadata: Map<String, Value>,
}

/// Fields supplied when recording a new playlist.
#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub user_id: u64,
    pub spotify_id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub kind: PlaylistKind,
    pub metadata: Map<String, Value>,
}
