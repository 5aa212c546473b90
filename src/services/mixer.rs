// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pure helpers for combining recommendation sources.
//!
//! Nothing in here performs I/O: the generators fetch from Spotify and hand
//! the results to these functions, which keeps ordering and de-duplication
//! rules testable on their own.

use crate::models::spotify::PlayHistoryItem;
use crate::models::{Artist, Track};
use std::collections::HashSet;

/// Ordered, de-duplicating track accumulator.
///
/// Tracks are kept in insertion order. A track whose ID was already seen
/// is dropped, so the first occurrence wins. Tracks without an ID (local
/// files) cannot be de-duplicated or saved and are skipped.
#[derive(Debug, Default)]
pub struct TrackMerger {
    tracks: Vec<Track>,
    seen: HashSet<String>,
}

impl TrackMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every unseen track. Returns how many were added.
    pub fn extend<I>(&mut self, tracks: I) -> usize
    where
        I: IntoIterator<Item = Track>,
    {
        self.extend_limited(tracks, usize::MAX)
    }

    /// Append unseen tracks until `max_new` have been added.
    pub fn extend_limited<I>(&mut self, tracks: I, max_new: usize) -> usize
    where
        I: IntoIterator<Item = Track>,
    {
        let mut added = 0;
        for track in tracks {
            if added >= max_new {
                break;
            }
            let Some(id) = track.id.as_deref() else {
                continue;
            };
            if self.seen.insert(id.to_string()) {
                self.tracks.push(track);
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    /// Consume the merger, keeping at most `limit` tracks.
    pub fn into_truncated(mut self, limit: usize) -> Vec<Track> {
        self.tracks.truncate(limit);
        self.tracks
    }
}

/// Remove repeated track IDs, keeping the first occurrence.
pub fn dedupe_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut merger = TrackMerger::new();
    merger.extend(tracks);
    merger.into_tracks()
}

/// Genres of the given artists that Spotify accepts as seeds.
///
/// Genres are considered in artist order, then in each artist's genre
/// order; the first `max` distinct matches are returned.
pub fn select_seed_genres(artists: &[Artist], available: &[String], max: usize) -> Vec<String> {
    let available: HashSet<&str> = available.iter().map(String::as_str).collect();
    let mut selected: Vec<String> = Vec::new();

    for genre in artists.iter().flat_map(|a| a.genres.iter()) {
        if selected.len() >= max {
            break;
        }
        if available.contains(genre.as_str()) && !selected.contains(genre) {
            selected.push(genre.clone());
        }
    }

    selected
}

/// IDs of tracks by `artist_id` found in recent history or top tracks.
///
/// Recent history comes first; each ID appears once.
pub fn played_track_ids(recent: &[PlayHistoryItem], top: &[Track], artist_id: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    recent
        .iter()
        .map(|item| &item.track)
        .chain(top.iter())
        .filter(|track| track.has_artist(artist_id))
        .filter_map(|track| track.id.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Total playing time in whole minutes, rounded to nearest.
pub fn total_duration_minutes(tracks: &[Track]) -> u64 {
    let total_ms: u64 = tracks.iter().filter_map(|t| t.duration_ms).sum();
    (total_ms + 30_000) / 60_000
}

/// Query parameters for the recommendations endpoint.
#[derive(Debug, Default, Clone)]
pub struct RecommendationQuery {
    params: Vec<(&'static str, String)>,
}

impl RecommendationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_genres<I>(self, genres: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.seed("seed_genres", genres)
    }

    pub fn seed_artists<I>(self, artist_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.seed("seed_artists", artist_ids)
    }

    pub fn seed_tracks<I>(self, track_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.seed("seed_tracks", track_ids)
    }

    fn seed<I>(mut self, key: &'static str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((key, joined));
        self
    }

    /// Add `target_<feature>=<value>`.
    pub fn target(mut self, feature: &str, value: f64) -> Self {
        let key = match feature {
            "tempo" => "target_tempo",
            "popularity" => "target_popularity",
            "acousticness" => "target_acousticness",
            "danceability" => "target_danceability",
            "energy" => "target_energy",
            "valence" => "target_valence",
            other => {
                tracing::warn!(feature = other, "Ignoring unknown audio feature target");
                return self;
            }
        };
        self.params.push((key, value.to_string()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.params.push(("limit", limit.to_string()));
        self
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }
}
