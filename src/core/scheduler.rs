//! Wall-clock aligned ticks for the polling loop.
//!
//! A tick fires whenever the Unix time in whole seconds is a multiple of the
//! interval, so cadence is phase-locked to the clock and never drifts.

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

/// First interval boundary strictly after `now`.
pub fn next_boundary(now: DateTime<Utc>, interval_secs: u64) -> DateTime<Utc> {
    let interval_ms = interval_secs.max(1) as i64 * 1000;
    let now_ms = now.timestamp_millis();
    let next_ms = (now_ms.div_euclid(interval_ms) + 1) * interval_ms;
    Utc.timestamp_millis_opt(next_ms)
        .single()
        .unwrap_or(now + chrono::Duration::milliseconds(interval_ms))
}

/// How long to sleep from `now` until the next boundary.
pub fn until_next_boundary(now: DateTime<Utc>, interval_secs: u64) -> Duration {
    (next_boundary(now, interval_secs) - now)
        .to_std()
        .unwrap_or_default()
}
