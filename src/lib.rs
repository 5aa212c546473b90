// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! SpotGen: playlist generation on top of the Spotify Web API
//!
//! This crate provides the backend API: Spotify login, a per-user token
//! lifecycle, proxies for the catalog endpoints the client browses, and
//! the playlist generators that combine them.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{SessionStore, SpotifyClient, SpotifyService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Store>,
    pub sessions: SessionStore,
    pub spotify_service: SpotifyService,
}

impl AppState {
    /// Wire up the services around a configuration and a store.
    pub fn new(config: Config, db: Arc<dyn Store>) -> Self {
        let refresh_locks = Arc::new(dashmap::DashMap::new());
        let spotify_service =
            SpotifyService::new(SpotifyClient::new(&config), db.clone(), refresh_locks);

        Self {
            config,
            db,
            sessions: SessionStore::default(),
            spotify_service,
        }
    }
}
