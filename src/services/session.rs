// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side session store.
//!
//! A session maps an opaque random ID to an internal user ID. Sessions
//! live for a fixed TTL that has nothing to do with the Spotify token
//! lifetime. Expired entries are evicted when they are looked up and
//! swept whenever a new session is created.

use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;

/// Session lifetime (24 hours).
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

const SESSION_ID_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: u64,
    expires_at: DateTime<Utc>,
}

/// In-memory session store, cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    rng: SystemRandom,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::seconds(SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            rng: SystemRandom::new(),
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for a user and return its ID.
    pub fn create(&self, user_id: u64) -> Result<String, AppError> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate session ID")))?;
        let session_id = hex::encode(bytes);

        let now = Utc::now();
        self.sessions.retain(|_, e| e.expires_at > now);

        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                user_id,
                expires_at: now + self.ttl,
            },
        );

        tracing::debug!(user_id, "Session created");
        Ok(session_id)
    }

    /// Look up the user of a live session.
    pub fn get(&self, session_id: &str) -> Option<u64> {
        let now = Utc::now();
        let entry = self.sessions.get(session_id)?.value().clone();
        if now < entry.expires_at {
            return Some(entry.user_id);
        }

        self.sessions
            .remove_if(session_id, |_, e| e.expires_at <= now);
        tracing::debug!(user_id = entry.user_id, "Session expired");
        None
    }

    /// End a session. Unknown IDs are ignored.
    pub fn destroy(&self, session_id: &str) {
        if let Some((_, entry)) = self.sessions.remove(session_id) {
            tracing::debug!(user_id = entry.user_id, "Session destroyed");
        }
    }

    /// Number of stored sessions, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
