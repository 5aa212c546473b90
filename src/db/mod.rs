//! Storage layer.
//!
//! Handlers only see the [`Store`] trait; [`MemoryStore`] is the
//! implementation used by the server today.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{NewPlaylist, NewUser, Playlist, User, UserTokens};
use async_trait::async_trait;

/// Persistence operations for users and playlist records.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    /// Get a user by internal ID.
    async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError>;

    /// Get a user by Spotify account ID.
    async fn get_user_by_spotify_id(&self, spotify_id: &str) -> Result<Option<User>, AppError>;

    /// Create the user, or replace the credentials of the existing user with
    /// the same Spotify account ID. Returns the stored record.
    async fn upsert_user(&self, user: NewUser) -> Result<User, AppError>;

    /// Replace a user's credential triple.
    ///
    /// Returns `None` if no such user exists.
    async fn update_user_tokens(
        &self,
        user_id: u64,
        tokens: &UserTokens,
    ) -> Result<Option<User>, AppError>;

    // ─── Playlists ───────────────────────────────────────────────

    /// Append a playlist record. Assigns its ID and creation time.
    async fn create_playlist(&self, playlist: NewPlaylist) -> Result<Playlist, AppError>;

    /// All playlist records owned by a user, oldest first.
    async fn get_playlists_for_user(&self, user_id: u64) -> Result<Vec<Playlist>, AppError>;

    /// The `limit` most recently created playlist records of a user, newest first.
    async fn get_recent_playlists_for_user(
        &self,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<Playlist>, AppError>;
}
