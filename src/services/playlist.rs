// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saving a generated playlist to Spotify and recording it locally.
//!
//! The save is three steps: create the remote playlist, add its tracks,
//! write the local record. A failure after the first step unfollows the
//! remote playlist so no orphan is left in the user's library, then the
//! original error is returned.

use crate::db::Store;
use crate::error::AppError;
use crate::models::spotify::first_image_url;
use crate::models::{NewPlaylist, Playlist, SavePlaylistRequest, User};
use crate::services::SpotifyClient;
use crate::time_utils::format_utc_date;
use chrono::Utc;
use serde_json::Value;

/// Metadata key holding the number of submitted track URIs.
pub const TOTAL_TRACKS_KEY: &str = "totalTracks";

/// Remote state created so far by one save. `None` until the remote
/// playlist exists.
struct PlaylistSaga<'a> {
    client: &'a SpotifyClient,
    access_token: &'a str,
    user_id: u64,
    remote_playlist_id: Option<String>,
}

impl PlaylistSaga<'_> {
    /// Undo remote work after a later step failed.
    async fn compensate(&self, cause: &AppError) {
        let Some(playlist_id) = self.remote_playlist_id.as_deref() else {
            tracing::warn!(
                user_id = self.user_id,
                error = %cause,
                "Playlist save failed before anything was created"
            );
            return;
        };

        tracing::warn!(
            user_id = self.user_id,
            playlist_id,
            error = %cause,
            "Playlist save failed, removing remote playlist"
        );

        if let Err(e) = self
            .client
            .unfollow_playlist(self.access_token, playlist_id)
            .await
        {
            tracing::error!(
                user_id = self.user_id,
                playlist_id,
                error = %e,
                "Failed to remove remote playlist, it is now orphaned"
            );
        }
    }
}

/// Default description for playlists saved without one.
pub fn default_description(now: chrono::DateTime<Utc>) -> String {
    format!("Generated by SpotGen - {}", format_utc_date(now))
}

/// Create the playlist on Spotify, fill it, and record it.
///
/// The returned record exists only if all three steps succeeded.
pub async fn save_playlist(
    client: &SpotifyClient,
    db: &dyn Store,
    user: &User,
    access_token: &str,
    request: SavePlaylistRequest,
) -> Result<Playlist, AppError> {
    let description = request
        .description
        .clone()
        .unwrap_or_else(|| default_description(Utc::now()));

    let mut saga = PlaylistSaga {
        client,
        access_token,
        user_id: user.id,
        remote_playlist_id: None,
    };

    let created = match client
        .create_playlist(access_token, &user.spotify_id, &request.name, &description)
        .await
    {
        Ok(created) => created,
        Err(e) => {
            // Nothing remote exists yet, so this only logs.
            saga.compensate(&e).await;
            return Err(e);
        }
    };
    saga.remote_playlist_id = Some(created.id.clone());

    tracing::info!(
        user_id = user.id,
        playlist_id = %created.id,
        tracks = request.track_uris.len(),
        "Remote playlist created"
    );

    if let Err(e) = client
        .add_tracks_to_playlist(access_token, &created.id, &request.track_uris)
        .await
    {
        saga.compensate(&e).await;
        return Err(e);
    }

    let mut metadata = request.metadata.unwrap_or_default();
    metadata.insert(
        TOTAL_TRACKS_KEY.to_string(),
        Value::from(request.track_uris.len()),
    );

    let record = NewPlaylist {
        user_id: user.id,
        spotify_id: created.id.clone(),
        name: request.name,
        description: Some(description),
        image_url: first_image_url(created.images.as_deref()),
        kind: request.kind,
        metadata,
    };

    match db.create_playlist(record).await {
        Ok(playlist) => {
            tracing::info!(
                user_id = user.id,
                playlist_id = %playlist.spotify_id,
                record_id = playlist.id,
                "Playlist saved"
            );
            Ok(playlist)
        }
        Err(e) => {
            saga.compensate(&e).await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::TimeZone;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_client() -> (SpotifyClient, MockServer) {
        let server = MockServer::start().await;
        let mut config = Config::test_default();
        config.spotify_api_base_url = format!("{}/v1", server.uri());
        config.spotify_accounts_base_url = server.uri();
        (SpotifyClient::new(&config), server)
    }

    #[tokio::test]
    async fn test_compensate_before_create_is_a_no_op() {
        let (client, server) = mock_client().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let saga = PlaylistSaga {
            client: &client,
            access_token: "token",
            user_id: 1,
            remote_playlist_id: None,
        };
        saga.compensate(&AppError::Upstream("create failed".to_string()))
            .await;
    }

    #[tokio::test]
    async fn test_compensate_unfollows_created_playlist() {
        let (client, server) = mock_client().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/playlists/p1/followers"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let saga = PlaylistSaga {
            client: &client,
            access_token: "token",
            user_id: 1,
            remote_playlist_id: Some("p1".to_string()),
        };
        saga.compensate(&AppError::Upstream("add failed".to_string()))
            .await;
    }

    #[test]
    fn test_default_description() {
        let now = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(default_description(now), "Generated by SpotGen - 2026-03-07");
    }
}
