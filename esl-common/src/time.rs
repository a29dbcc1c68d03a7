//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Whole seconds elapsed since `since`, clamped at zero
pub fn seconds_since(since: DateTime<Utc>) -> u64 {
    now().signed_duration_since(since).num_seconds().max(0) as u64
}
