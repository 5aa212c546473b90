// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Utc};

/// Format the calendar date of a UTC timestamp as `YYYY-MM-DD`.
pub fn format_utc_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}
