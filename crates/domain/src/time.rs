//! Time and timestamp helpers.

use chrono::{DateTime, TimeDelta, Utc};

/// UTC timestamp used for token issue times and refresh bookkeeping.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whether something issued at `issued_at` is older than `lifetime` at `at`.
#[must_use]
pub fn is_expired(issued_at: Timestamp, lifetime: TimeDelta, at: Timestamp) -> bool {
    at - issued_at > lifetime
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_not_be_expired_within_lifetime() {
        let issued = now();
        let at = issued + TimeDelta::minutes(49);
        assert!(!is_expired(issued, TimeDelta::minutes(50), at));
    }

    #[test]
    fn should_be_expired_after_lifetime() {
        let issued = now();
        let at = issued + TimeDelta::minutes(51);
        assert!(is_expired(issued, TimeDelta::minutes(50), at));
    }
}
