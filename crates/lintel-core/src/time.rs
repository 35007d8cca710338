//! Epoch-seconds timestamps.
//!
//! All persisted timestamps are unix epoch seconds (i64), UTC.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds.
pub fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

pub const SECS_PER_DAY: i64 = 86_400;
