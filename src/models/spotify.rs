// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Spotify Web API payloads.
//!
//! Only the fields this service reads are typed. Everything else the API
//! returns is kept in a flattened map so proxied tracks reach the client
//! unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A track object as returned by the Web API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// `None` for local files
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artists: Option<Vec<ArtistRef>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    /// Whether any credited artist has the given ID.
    pub fn has_artist(&self, artist_id: &str) -> bool {
        self.artists
            .iter()
            .flatten()
            .any(|a| a.id.as_deref() == Some(artist_id))
    }
}

/// Simplified artist embedded in a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full artist object (top artists, related artists).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paging object; only `items` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// `{ "tracks": [...] }` bodies (recommendations, artist top tracks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackList {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `{ "artists": [...] }` body of the related-artists endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistList {
    #[serde(default)]
    pub artists: Vec<Artist>,
}

/// Item of the recently-played history.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayHistoryItem {
    pub track: Track,
}

/// Item of the user's saved tracks library.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedTrack {
    pub track: Track,
}

/// Available genre seeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreSeeds {
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Profile image.
#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
}

/// Current user's profile (`GET /me`).
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
}

/// Playlist returned by the create-playlist endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPlaylist {
    pub id: String,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
}

/// Token endpoint response, for both grant types.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Omitted on some refresh responses
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// First image URL of an optional image list.
pub fn first_image_url(images: Option<&[Image]>) -> Option<String> {
    images.and_then(|imgs| imgs.first()).map(|img| img.url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_keeps_unknown_fields() {
        let raw = json!({
            "id": "t1",
            "name": "Song",
            "uri": "spotify:track:t1",
            "duration_ms": 180000,
            "artists": [{ "id": "a1", "name": "Band" }],
            "album": { "name": "Record" }
        });

        let track: Track = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(track.id.as_deref(), Some("t1"));
        assert!(track.has_artist("a1"));
        assert!(!track.has_artist("a2"));

        assert_eq!(serde_json::to_value(&track).unwrap(), raw);
    }

    #[test]
    fn test_local_track_has_no_id() {
        let track: Track =
            serde_json::from_value(json!({ "id": null, "name": "Local" })).unwrap();
        assert!(track.id.is_none());
        assert_eq!(track.duration_ms, None);
    }

    #[test]
    fn test_missing_fields_stay_missing() {
        let raw = json!({ "id": "t1", "name": "Sparse" });

        let track: Track = serde_json::from_value(raw.clone()).unwrap();
        assert!(!track.has_artist("a1"));
        assert_eq!(serde_json::to_value(&track).unwrap(), raw);

        let list: TrackList = serde_json::from_value(json!({ "tracks": [raw.clone()] })).unwrap();
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({ "tracks": [raw] })
        );
    }
}
