use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};

/// A session with no reviews is assumed to have lasted this long.
pub const DEFAULT_SESSION_MINUTES: i64 = 30;

/// End time is never persisted: it is the timestamp of the session's
/// last review, or the start plus a fixed 30-minute default when no
/// reviews were recorded.
pub fn derive_end_time(start: NaiveDateTime, last_review: Option<NaiveDateTime>) -> NaiveDateTime {
    last_review.unwrap_or_else(|| start + Duration::minutes(DEFAULT_SESSION_MINUTES))
}

/// Timestamps are stored as UTC and serialized RFC 3339.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(value, Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn no_reviews_defaults_to_start_plus_thirty_minutes() {
        assert_eq!(derive_end_time(at(10, 0), None), at(10, 30));
    }

    #[test]
    fn last_review_wins_over_default() {
        assert_eq!(derive_end_time(at(10, 0), Some(at(10, 7))), at(10, 7));
    }

    #[test]
    fn timestamps_format_as_rfc3339_utc() {
        assert_eq!(format_timestamp(at(10, 0)), "2024-01-01T10:00:00.000Z");
    }
}
