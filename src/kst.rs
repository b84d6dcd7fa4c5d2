//! Business-timezone clock.
//!
//! The marketplace operates on KST (UTC+9). Every deadline computation and
//! comparison goes through this module instead of server-local time, so the
//! service behaves the same regardless of where it is deployed.

use chrono::{DateTime, Duration, FixedOffset, Utc};

const OFFSET_SECS: i32 = 9 * 3600;

/// The fixed UTC+9 business offset.
#[must_use]
pub fn offset() -> FixedOffset {
    FixedOffset::east_opt(OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// Current time in the business timezone.
#[must_use]
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset())
}

/// A deadline `days` days after `from`.
#[must_use]
pub fn days_after(from: DateTime<FixedOffset>, days: i64) -> DateTime<FixedOffset> {
    from + Duration::days(days)
}

/// Render a timestamp the way the database stores it.
///
/// All stored timestamps carry the +09:00 offset, so RFC 3339 strings compare
/// chronologically with plain string comparison.
#[must_use]
pub fn to_db(ts: DateTime<FixedOffset>) -> String {
    ts.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_after() {
        let base = now();
        let later = days_after(base, 3);
        assert_eq!((later - base).num_days(), 3);
    }

    #[test]
    fn test_db_strings_order_chronologically() {
        let base = now();
        let earlier = to_db(base);
        let later = to_db(days_after(base, 7));
        assert!(earlier < later);
    }
}
