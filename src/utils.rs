//! Shared utility functions.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Current wall-clock time as fractional seconds since the Unix epoch.
///
/// Expiration stamps in the document use this representation.
pub fn now_stamp() -> f64 {
    to_stamp(Utc::now())
}

/// Convert a UTC timestamp to fractional epoch seconds.
#[allow(clippy::cast_precision_loss)]
pub fn to_stamp(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// Absolute stamp lying `after` past `now`.
pub fn stamp_after(now: f64, after: Duration) -> f64 {
    now + after.as_secs_f64()
}

/// Remaining time until `expire_at`, or `None` once it has passed.
pub fn remaining(expire_at: f64, now: f64) -> Option<Duration> {
    if now > expire_at {
        return None;
    }
    Duration::try_from_secs_f64(expire_at - now).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_stamp_keeps_fraction() {
        let at = DateTime::<Utc>::from_timestamp_micros(1_500_000).unwrap();
        assert!((to_stamp(at) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remaining_before_and_after() {
        assert_eq!(remaining(10.0, 7.5), Some(Duration::from_millis(2500)));
        assert_eq!(remaining(10.0, 10.0), Some(Duration::ZERO));
        assert_eq!(remaining(10.0, 10.001), None);
    }

    #[test]
    fn test_stamp_after() {
        let stamp = stamp_after(100.0, Duration::from_millis(250));
        assert!((stamp - 100.25).abs() < 1e-9);
    }

    #[test]
    fn test_now_stamp_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(now_stamp() > 1_577_836_800.0);
    }
}
