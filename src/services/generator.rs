// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Playlist generator flows.
//!
//! Each flow takes an already-validated request and a valid access token,
//! makes its Spotify calls one after another, and combines the results with
//! the helpers in [`crate::services::mixer`].

use crate::error::AppError;
use crate::models::recommendation::{MoodMixResponse, TracksResponse, MAX_SEEDS};
use crate::models::spotify::TrackList;
use crate::models::{
    ArtistMixRequest, GenreMixRequest, MixResponse, MoodMixMetadata, MoodMixRequest,
};
use crate::services::mixer::{
    played_track_ids, select_seed_genres, total_duration_minutes, RecommendationQuery,
    TrackMerger,
};
use crate::services::SpotifyClient;

/// Related artists consulted by the artist mix.
const RELATED_ARTISTS: usize = 3;
/// Top tracks taken from each related artist.
const TRACKS_PER_RELATED_ARTIST: usize = 3;
/// Seed genres taken from the user's top artists by the mood mix.
const MOOD_SEED_GENRES: usize = 2;
/// Seed artists used by the mood mix when no genre matches.
const MOOD_SEED_ARTISTS: usize = 3;
/// Recommendations requested by the daily and must-listen mixes.
const DAILY_LIMIT: u32 = 20;
/// Saved tracks leading the must-listen mix.
const MUST_LISTEN_SAVED: usize = 5;
/// Recommended tracks appended to the must-listen mix.
const MUST_LISTEN_RECOMMENDED: usize = 15;
/// History/top-track page size used when looking for played tracks.
const PLAYED_LOOKBACK: u32 = 50;

pub const DAILY_MIX_NAME: &str = "Your Daily Spark";
pub const MUST_LISTEN_MIX_NAME: &str = "Your Must-Listen Mix";

/// Genre mix: one recommendations call, body returned as Spotify sent it.
pub async fn genre_mix(
    client: &SpotifyClient,
    access_token: &str,
    request: &GenreMixRequest,
) -> Result<TrackList, AppError> {
    let query = request
        .targets()
        .into_iter()
        .fold(RecommendationQuery::new(), |q, (feature, value)| {
            q.target(feature, value)
        })
        .seed_genres(&request.genres)
        .limit(request.limit);

    client
        .get_recommendations(access_token, query.params())
        .await
}

/// Artist mix.
///
/// Order: seed recommendations, then each requested artist's top tracks,
/// then the first few top tracks of the first artist's related artists.
/// Repeated IDs are dropped and the result is cut to `limit`.
pub async fn artist_mix(
    client: &SpotifyClient,
    access_token: &str,
    request: &ArtistMixRequest,
) -> Result<TracksResponse, AppError> {
    let artist_ids: Vec<&str> = request
        .artist_ids
        .iter()
        .take(MAX_SEEDS)
        .map(String::as_str)
        .collect();

    let query = RecommendationQuery::new()
        .seed_artists(&artist_ids)
        .limit(request.limit);
    let seeded = client
        .get_recommendations(access_token, query.params())
        .await?;

    let mut merger = TrackMerger::new();
    merger.extend(seeded.tracks);

    if request.include_top_tracks {
        for artist_id in &artist_ids {
            let top = client.get_artist_top_tracks(access_token, artist_id).await?;
            merger.extend(top.tracks);
        }
    }

    if request.include_related_artists {
        if let Some(first) = artist_ids.first() {
            let related = client.get_related_artists(access_token, first).await?;
            for artist in related.into_iter().take(RELATED_ARTISTS) {
                let top = client.get_artist_top_tracks(access_token, &artist.id).await?;
                merger.extend(top.tracks.into_iter().take(TRACKS_PER_RELATED_ARTIST));
            }
        }
    }

    tracing::debug!(
        collected = merger.len(),
        limit = request.limit,
        "Artist mix assembled"
    );

    Ok(TracksResponse {
        tracks: merger.into_truncated(request.limit as usize),
    })
}

/// Mood mix.
///
/// Seeds with the requested genre, or with genres of the user's top artists
/// that Spotify accepts as seeds, or, failing both, with the top artists
/// themselves.
pub async fn mood_mix(
    client: &SpotifyClient,
    access_token: &str,
    request: &MoodMixRequest,
) -> Result<MoodMixResponse, AppError> {
    let mut query = request
        .mood
        .targets()
        .iter()
        .fold(RecommendationQuery::new(), |q, (feature, value)| {
            q.target(feature, *value)
        });

    query = match request.seed_genre() {
        Some(genre) => query.seed_genres([genre]),
        None => {
            let top_artists = client
                .get_top_artists(access_token, Some("medium_term"), 5)
                .await?;
            let available = client.get_available_genre_seeds(access_token).await?;
            let genres = select_seed_genres(&top_artists, &available, MOOD_SEED_GENRES);

            if genres.is_empty() {
                let artist_ids: Vec<&str> = top_artists
                    .iter()
                    .take(MOOD_SEED_ARTISTS)
                    .map(|a| a.id.as_str())
                    .collect();
                tracing::debug!(
                    mood = ?request.mood,
                    seeds = artist_ids.len(),
                    "No seedable genres, seeding mood mix by top artists"
                );
                query.seed_artists(&artist_ids)
            } else {
                query.seed_genres(&genres)
            }
        }
    };

    let tracks = client
        .get_recommendations(access_token, query.limit(request.limit).params())
        .await?
        .tracks;

    let metadata = MoodMixMetadata {
        mood: request.mood,
        genre: request.seed_genre().map(str::to_string),
        total_tracks: tracks.len(),
        total_duration_min: total_duration_minutes(&tracks),
    };

    Ok(MoodMixResponse { tracks, metadata })
}

/// Daily mix, seeded by short-term top tracks or, without any, by recent plays.
pub async fn daily_mix(client: &SpotifyClient, access_token: &str) -> Result<MixResponse, AppError> {
    let top_ids: Vec<String> = client
        .get_top_tracks(access_token, Some("short_term"), MAX_SEEDS as u32)
        .await?
        .into_iter()
        .filter_map(|t| t.id)
        .collect();

    let (seed_ids, description) = if top_ids.is_empty() {
        let recent_ids: Vec<String> = client
            .get_recently_played(access_token, MAX_SEEDS as u32)
            .await?
            .into_iter()
            .filter_map(|item| item.track.id)
            .take(MAX_SEEDS)
            .collect();

        if recent_ids.is_empty() {
            return Err(AppError::NotFound(
                "No tracks found to base recommendations on".to_string(),
            ));
        }
        (recent_ids, "Based on your recent listening")
    } else {
        (top_ids, "Based on what you've been enjoying lately")
    };

    let query = RecommendationQuery::new()
        .seed_tracks(&seed_ids)
        .limit(DAILY_LIMIT);
    let recommendations = client
        .get_recommendations(access_token, query.params())
        .await?;

    Ok(MixResponse {
        name: DAILY_MIX_NAME.to_string(),
        description: description.to_string(),
        tracks: recommendations.tracks,
    })
}

/// Must-listen mix: a few saved tracks followed by recommendations seeded
/// by the user's two favourite artists.
pub async fn must_listen_mix(
    client: &SpotifyClient,
    access_token: &str,
) -> Result<MixResponse, AppError> {
    let saved = client.get_saved_tracks(access_token, 50).await?;
    let top_artists = client
        .get_top_artists(access_token, Some("medium_term"), 10)
        .await?;

    let seed_ids: Vec<&str> = top_artists.iter().take(2).map(|a| a.id.as_str()).collect();
    let query = RecommendationQuery::new()
        .seed_artists(&seed_ids)
        .limit(DAILY_LIMIT);
    let recommendations = client
        .get_recommendations(access_token, query.params())
        .await?;

    let mut merger = TrackMerger::new();
    merger.extend(saved.into_iter().take(MUST_LISTEN_SAVED));
    merger.extend_limited(recommendations.tracks, MUST_LISTEN_RECOMMENDED);

    Ok(MixResponse {
        name: MUST_LISTEN_MIX_NAME.to_string(),
        description: "Tracks we think you'll love based on your taste".to_string(),
        tracks: merger.into_tracks(),
    })
}

/// IDs of the artist's tracks the user played recently or ranks among their top tracks.
pub async fn played_tracks_for_artist(
    client: &SpotifyClient,
    access_token: &str,
    artist_id: &str,
) -> Result<Vec<String>, AppError> {
    let recent = client
        .get_recently_played(access_token, PLAYED_LOOKBACK)
        .await?;
    let top = client
        .get_top_tracks(access_token, None, PLAYED_LOOKBACK)
        .await?;

    Ok(played_track_ids(&recent, &top, artist_id))
}
