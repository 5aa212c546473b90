// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod playlist;
pub mod recommendation;
pub mod spotify;
pub mod user;

pub use playlist::{NewPlaylist, Playlist, PlaylistKind};
pub use recommendation::{
    ArtistMixRequest, GenreMixRequest, MixResponse, Mood, MoodMixMetadata, MoodMixRequest,
    SavePlaylistRequest,
};
pub use spotify::{Artist, Track};
pub use user::{NewUser, User, UserTokens};
