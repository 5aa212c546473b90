// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod generator;
pub mod mixer;
pub mod playlist;
pub mod session;
pub mod spotify;

pub use session::SessionStore;
pub use spotify::{RefreshLocks, SpotifyClient, SpotifyService};
