// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Request and response bodies for the playlist generator endpoints.

use crate::models::{PlaylistKind, Track};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Maximum number of seeds Spotify accepts per recommendation call.
pub const MAX_SEEDS: usize = 5;

fn default_limit() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

fn default_duration() -> u32 {
    60
}

/// Genre mix parameters.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenreMixRequest {
    #[validate(length(min = 1, max = 5))]
    pub genres: Vec<String>,
    pub tempo: Option<f64>,
    pub popularity: Option<f64>,
    pub acousticness: Option<f64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
}

impl GenreMixRequest {
    /// Audio feature targets the client set to a non-zero value.
    pub fn targets(&self) -> Vec<(&'static str, f64)> {
        [
            ("tempo", self.tempo),
            ("popularity", self.popularity),
            ("acousticness", self.acousticness),
            ("danceability", self.danceability),
            ("energy", self.energy),
        ]
        .into_iter()
        .filter_map(|(feature, value)| value.filter(|v| *v != 0.0).map(|v| (feature, v)))
        .collect()
    }
}

/// Artist mix parameters.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ArtistMixRequest {
    #[validate(length(min = 1, max = 5))]
    pub artist_ids: Vec<String>,
    #[serde(default = "default_true")]
    pub include_top_tracks: bool,
    #[serde(default = "default_true")]
    pub include_related_artists: bool,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
}

/// Moods offered by the mood generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Chill,
    Energetic,
    Romantic,
    Dreamy,
    Angry,
}

impl Mood {
    /// Target audio features passed to the recommendations endpoint.
    pub fn targets(self) -> &'static [(&'static str, f64)] {
        match self {
            Mood::Happy => &[("valence", 0.8), ("energy", 0.7), ("danceability", 0.7)],
            Mood::Chill => &[("valence", 0.5), ("energy", 0.4), ("acousticness", 0.7)],
            Mood::Energetic => &[("energy", 0.9), ("tempo", 150.0), ("danceability", 0.8)],
            Mood::Romantic => &[("valence", 0.6), ("energy", 0.4), ("acousticness", 0.6)],
            Mood::Dreamy => &[("valence", 0.5), ("energy", 0.3), ("acousticness", 0.7)],
            Mood::Angry => &[("valence", 0.2), ("energy", 0.9), ("tempo", 140.0)],
        }
    }
}

/// Mood mix parameters.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoodMixRequest {
    pub mood: Mood,
    pub genre: Option<String>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    /// Desired length in minutes. Informational only.
    #[serde(default = "default_duration")]
    #[validate(range(min = 15, max = 180))]
    pub duration: u32,
}

impl MoodMixRequest {
    /// Seed genre chosen by the client, ignoring blanks.
    pub fn seed_genre(&self) -> Option<&str> {
        self.genre.as_deref().map(str::trim).filter(|g| !g.is_empty())
    }
}

/// Save-playlist parameters.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SavePlaylistRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub track_uris: Vec<String>,
    #[serde(rename = "type")]
    pub kind: PlaylistKind,
    pub metadata: Option<Map<String, Value>>,
}

/// Named mix (daily, must-listen).
#[derive(Debug, Clone, Serialize)]
pub struct MixResponse {
    pub name: String,
    pub description: String,
    pub tracks: Vec<Track>,
}

/// Tracks-only mix (artist mix).
#[derive(Debug, Clone, Serialize)]
pub struct TracksResponse {
    pub tracks: Vec<Track>,
}

/// Mood mix with computed metadata.
#[derive(Debug, Clone, Serialize)]
pub struct MoodMixResponse {
    pub tracks: Vec<Track>,
    pub metadata: MoodMixMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MoodMixMetadata {
    pub mood: Mood,
    pub genre: Option<String>,
    pub total_tracks: usize,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_duration_min: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn genre_request(count: usize) -> GenreMixRequest {
        let genres: Vec<String> = (0..count).map(|i| format!("genre-{}", i)).collect();
        serde_json::from_value(json!({ "genres": genres })).unwrap()
    }

    #[test]
    fn test_genre_count_bounds() {
        assert!(genre_request(0).validate().is_err());
        assert!(genre_request(1).validate().is_ok());
        assert!(genre_request(5).validate().is_ok());
        assert!(genre_request(6).validate().is_err());
    }

    #[test]
    fn test_genre_limit_defaults_and_bounds() {
        let req = genre_request(1);
        assert_eq!(req.limit, 20);

        let req: GenreMixRequest =
            serde_json::from_value(json!({ "genres": ["rock"], "limit": 101 })).unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("limit"));
    }

    #[test]
    fn test_genre_targets_skip_zero_and_missing() {
        let req: GenreMixRequest = serde_json::from_value(json!({
            "genres": ["rock"],
            "tempo": 120.0,
            "energy": 0,
            "danceability": 0.5
        }))
        .unwrap();

        assert_eq!(req.targets(), vec![("tempo", 120.0), ("danceability", 0.5)]);
    }

    #[test]
    fn test_artist_request_defaults() {
        let req: ArtistMixRequest =
            serde_json::from_value(json!({ "artistIds": ["a1"] })).unwrap();
        assert!(req.include_top_tracks);
        assert!(req.include_related_artists);
        assert_eq!(req.limit, 20);
        assert!(req.validate().is_ok());

        let req: ArtistMixRequest = serde_json::from_value(
            json!({ "artistIds": ["a", "b", "c", "d", "e", "f"] }),
        )
        .unwrap();
        let err = req.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("artist_ids") || fields.contains_key("artistIds"));
    }

    #[test]
    fn test_mood_request_parsing() {
        let req: MoodMixRequest =
            serde_json::from_value(json!({ "mood": "energetic", "genre": "  " })).unwrap();
        assert_eq!(req.mood, Mood::Energetic);
        assert_eq!(req.seed_genre(), None);
        assert_eq!(req.duration, 60);
        assert!(req.validate().is_ok());

        assert!(serde_json::from_value::<MoodMixRequest>(json!({ "mood": "sleepy" })).is_err());

        let req: MoodMixRequest =
            serde_json::from_value(json!({ "mood": "chill", "duration": 10 })).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_energetic_targets() {
        assert_eq!(
            Mood::Energetic.targets(),
            &[("energy", 0.9), ("tempo", 150.0), ("danceability", 0.8)]
        );
    }

    #[test]
    fn test_save_request_requires_tracks() {
        let req: SavePlaylistRequest = serde_json::from_value(json!({
            "name": "Mix",
            "trackUris": [],
            "type": "genre"
        }))
        .unwrap();
        let err = req.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("track_uris") || fields.contains_key("trackUris"));
    }
}
