// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store backed by `DashMap`.
//!
//! Data lives for the lifetime of the process. IDs are assigned from
//! atomic counters starting at 1.

use super::Store;
use crate::error::AppError;
use crate::models::{NewPlaylist, NewUser, Playlist, User, UserTokens};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory implementation of [`Store`].
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<u64, User>,
    /// Spotify account ID -> internal user ID
    spotify_index: DashMap<String, u64>,
    playlists: DashMap<u64, Playlist>,
    user_seq: AtomicU64,
    playlist_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn playlists_for(&self, user_id: u64) -> Vec<Playlist> {
        self.playlists
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&user_id).map(|u| u.value().clone()))
    }

    async fn get_user_by_spotify_id(&self, spotify_id: &str) -> Result<Option<User>, AppError> {
        let Some(user_id) = self.spotify_index.get(spotify_id).map(|id| *id) else {
            return Ok(None);
        };
        self.get_user(user_id).await
    }

    async fn upsert_user(&self, new_user: NewUser) -> Result<User, AppError> {
        // Holding the index entry serializes concurrent logins of one account.
        match self.spotify_index.entry(new_user.spotify_id.clone()) {
            Entry::Occupied(entry) => {
                let user_id = *entry.get();
                let mut user = self.users.get_mut(&user_id).ok_or_else(|| {
                    AppError::Database(format!("Index points at missing user {}", user_id))
                })?;
                user.tokens = new_user.tokens;
                Ok(user.clone())
            }
            Entry::Vacant(entry) => {
                let user_id = self.user_seq.fetch_add(1, Ordering::SeqCst) + 1;
                let user = User {
                    id: user_id,
                    spotify_id: new_user.spotify_id,
                    display_name: new_user.display_name,
                    email: new_user.email,
                    image_url: new_user.image_url,
                    tokens: new_user.tokens,
                };
                self.users.insert(user_id, user.clone());
                entry.insert(user_id);
                Ok(user)
            }
        }
    }

    async fn update_user_tokens(
        &self,
        user_id: u64,
        tokens: &UserTokens,
    ) -> Result<Option<User>, AppError> {
        Ok(self.users.get_mut(&user_id).map(|mut user| {
            user.tokens = tokens.clone();
            user.clone()
        }))
    }

    async fn create_playlist(&self, new_playlist: NewPlaylist) -> Result<Playlist, AppError> {
        let id = self.playlist_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let playlist = Playlist {
            id,
            user_id: new_playlist.user_id,
            spotify_id: new_playlist.spotify_id,
            name: new_playlist.name,
            description: new_playlist.description,
            image_url: new_playlist.image_url,
            created_at: chrono::Utc::now(),
            kind: new_playlist.kind,
            metadata: new_playlist.metadata,
        };
        self.playlists.insert(id, playlist.clone());
        Ok(playlist)
    }

    async fn get_playlists_for_user(&self, user_id: u64) -> Result<Vec<Playlist>, AppError> {
        let mut playlists = self.playlists_for(user_id);
        playlists.sort_by_key(|p| p.id);
        Ok(playlists)
    }

    async fn get_recent_playlists_for_user(
        &self,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<Playlist>, AppError> {
        let mut playlists = self.playlists_for(user_id);
        playlists.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        playlists.truncate(limit);
        Ok(playlists)
    }
}
