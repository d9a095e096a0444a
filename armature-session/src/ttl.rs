//! Expiry policy for stored sessions.

use std::time::Duration;

/// One day, used when neither the store nor the cookie sets a lifetime.
pub const DEFAULT_TTL_SECS: i64 = 86_400;

/// Decides the TTL (in seconds) attached to each saved session.
///
/// Precedence: a fixed store-level TTL, then the cookie's `maxAge`
/// (milliseconds, floored to seconds), then [`DEFAULT_TTL_SECS`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtlPolicy {
    fixed: Option<Duration>,
}

impl TtlPolicy {
    /// Create a policy. A duration shorter than one second counts as unset.
    pub fn new(fixed: Option<Duration>) -> Self {
        Self {
            fixed: fixed.filter(|ttl| ttl.as_secs() > 0),
        }
    }

    /// The store-level TTL, if any.
    pub fn fixed(&self) -> Option<Duration> {
        self.fixed
    }

    /// TTL in seconds for a session whose cookie `maxAge` is `max_age_ms`.
    ///
    /// The result is not clamped: a negative or sub-second `maxAge` yields a
    /// non-positive TTL, which the backend rejects.
    pub fn expiry_secs(&self, max_age_ms: Option<f64>) -> i64 {
        if let Some(ttl) = self.fixed {
            return i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        }

        match max_age_ms {
            Some(ms) if ms.is_finite() => (ms / 1000.0).floor() as i64,
            _ => DEFAULT_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_ttl_wins() {
        let policy = TtlPolicy::new(Some(Duration::from_secs(60)));
        assert_eq!(policy.expiry_secs(Some(5000.0)), 60);
        assert_eq!(policy.expiry_secs(None), 60);
    }

    #[test]
    fn test_max_age_is_floored_to_seconds() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.expiry_secs(Some(120_000.0)), 120);
        assert_eq!(policy.expiry_secs(Some(30_999.0)), 30);
        assert_eq!(policy.expiry_secs(Some(1500.5)), 1);
    }

    #[test]
    fn test_default_is_one_day() {
        assert_eq!(TtlPolicy::default().expiry_secs(None), 86_400);
        assert_eq!(TtlPolicy::new(None).expiry_secs(Some(f64::NAN)), 86_400);
    }

    #[test]
    fn test_zero_store_ttl_falls_through() {
        let policy = TtlPolicy::new(Some(Duration::ZERO));
        assert_eq!(policy.fixed(), None);
        assert_eq!(policy.expiry_secs(Some(10_000.0)), 10);
        assert_eq!(policy.expiry_secs(None), DEFAULT_TTL_SECS);
    }

    #[test]
    fn test_sub_second_store_ttl_falls_through() {
        let policy = TtlPolicy::new(Some(Duration::from_millis(500)));
        assert_eq!(policy.fixed(), None);
        assert_eq!(policy.expiry_secs(Some(10_000.0)), 10);
        assert_eq!(policy.expiry_secs(None), DEFAULT_TTL_SECS);

        let policy = TtlPolicy::new(Some(Duration::from_millis(1500)));
        assert_eq!(policy.expiry_secs(None), 1);
    }

    #[test]
    fn test_sub_second_and_negative_max_age_pass_through() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.expiry_secs(Some(999.0)), 0);
        assert_eq!(policy.expiry_secs(Some(-5000.0)), -5);
    }
}
