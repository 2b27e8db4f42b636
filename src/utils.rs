use std::time::Duration;

use crate::constants::{DEFAULT_CONCURRENT_FETCHES, DEFAULT_PACE_MS};

/// Minimum interval between provider requests, from DONGFENG_PACE_MS or the
/// default.
pub fn get_pace_interval() -> Duration {
    let ms = std::env::var("DONGFENG_PACE_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PACE_MS);
    Duration::from_millis(ms)
}

/// Concurrent per-code fetches per batch, from DONGFENG_CONCURRENCY or the
/// default. Always at least 1.
pub fn get_concurrency() -> usize {
    std::env::var("DONGFENG_CONCURRENCY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CONCURRENT_FETCHES)
        .max(1)
}
