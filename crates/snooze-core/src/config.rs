//! Grace-period duration parsing.
//!
//! Accepts compound duration strings in the `1h30m` style (`h`, `m`,
//! `s`, `ms` units) and bare integers as seconds. Malformed or unset
//! values fall back to [`DEFAULT_GRACE_PERIOD`]; the fallback is
//! reported once at startup, not per timer.

use std::time::Duration;

use tracing::{info, warn};

/// Grace period used when the configured value is unset or malformed.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(3600);

/// Parse a compound duration string like "1h30m", "90s", "500ms".
///
/// A bare integer is treated as seconds. Returns None on any malformed
/// input rather than a partial parse.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<u64>().ok().map(Duration::from_secs);
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits_end == 0 {
            return None;
        }
        let (digits, tail) = rest.split_at(digits_end);
        let value: u64 = digits.parse().ok()?;

        // Checked arithmetic throughout: a parseable-but-absurd value
        // must report malformed (and take the fallback), not panic.
        let (segment, tail) = if let Some(tail) = tail.strip_prefix("ms") {
            (Duration::from_millis(value), tail)
        } else if let Some(tail) = tail.strip_prefix('h') {
            (Duration::from_secs(value.checked_mul(3600)?), tail)
        } else if let Some(tail) = tail.strip_prefix('m') {
            (Duration::from_secs(value.checked_mul(60)?), tail)
        } else if let Some(tail) = tail.strip_prefix('s') {
            (Duration::from_secs(value), tail)
        } else {
            return None;
        };
        total = total.checked_add(segment)?;
        rest = tail;
    }
    Some(total)
}

/// Effective grace period for a possibly-unset configured value.
///
/// Called once at startup; logs the fallback decision so malformed
/// configuration is visible without being fatal.
pub fn grace_period(configured: Option<&str>) -> Duration {
    match configured {
        Some(value) => match parse_duration(value) {
            Some(duration) => duration,
            None => {
                warn!(value = %value, "invalid grace period, falling back to 1h");
                DEFAULT_GRACE_PERIOD
            }
        },
        None => {
            info!("grace period not set, using default of 1h");
            DEFAULT_GRACE_PERIOD
        }
    }
}
