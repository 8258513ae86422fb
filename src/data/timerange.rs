//! Relative range tokens and their absolute windows.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};
use nodewatch_types::{TimeRange, WIRE_DATETIME_FORMAT};
use serde::Serialize;

/// Relative time range offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum RangeToken {
    OneHour,
    #[default]
    SixHours,
    TwentyFourHours,
    /// Everything since the epoch.
    Full,
}

impl RangeToken {
    /// Tokens in the order the UI cycles through them.
    pub const ALL: [RangeToken; 4] = [
        RangeToken::OneHour,
        RangeToken::SixHours,
        RangeToken::TwentyFourHours,
        RangeToken::Full,
    ];

    /// Parse a token. Unrecognized input means full history.
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "1h" => RangeToken::OneHour,
            "6h" => RangeToken::SixHours,
            "24h" => RangeToken::TwentyFourHours,
            _ => RangeToken::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeToken::OneHour => "1h",
            RangeToken::SixHours => "6h",
            RangeToken::TwentyFourHours => "24h",
            RangeToken::Full => "all",
        }
    }

    /// Length of the window, `None` for full history.
    pub fn duration(&self) -> Option<TimeDelta> {
        match self {
            RangeToken::OneHour => Some(TimeDelta::hours(1)),
            RangeToken::SixHours => Some(TimeDelta::hours(6)),
            RangeToken::TwentyFourHours => Some(TimeDelta::hours(24)),
            RangeToken::Full => None,
        }
    }

    /// Next token in UI order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            RangeToken::OneHour => RangeToken::SixHours,
            RangeToken::SixHours => RangeToken::TwentyFourHours,
            RangeToken::TwentyFourHours => RangeToken::Full,
            RangeToken::Full => RangeToken::OneHour,
        }
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RangeToken> for String {
    fn from(token: RangeToken) -> Self {
        token.as_str().to_string()
    }
}

/// Resolve a token against the current local time.
pub fn resolve(token: RangeToken) -> TimeRange {
    resolve_at(token, &Local::now())
}

/// Resolve a token against a given instant.
///
/// `end` is `now`, `start` is `now` minus the token's duration (or the
/// epoch for full history). Both are rendered in `now`'s time zone with
/// [`WIRE_DATETIME_FORMAT`], truncated to whole seconds.
pub fn resolve_at<Tz>(token: RangeToken, now: &DateTime<Tz>) -> TimeRange
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let start = match token.duration() {
        Some(span) => now.clone() - span,
        None => DateTime::<Utc>::UNIX_EPOCH.with_timezone(&now.timezone()),
    };

    TimeRange::new(format_wire(&start), format_wire(now))
}

/// Format an instant the way the API expects it.
pub fn format_wire<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    instant.format(WIRE_DATETIME_FORMAT).to_string()
}

/// Parse a timestamp sent by the API into local wall-clock time.
///
/// Accepts the wire format, its `T`-separated variant (optionally with
/// fractional seconds) and RFC 3339 with an offset, which is converted to
/// local time.
pub fn parse_wire(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    const NAIVE_FORMATS: [&str; 4] = [
        WIRE_DATETIME_FORMAT,
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Local).naive_local())
        })
}

/// Whether a heartbeat falls inside the token's window ending at `now`.
///
/// Full history accepts every heartbeat, even an unparseable one; for the
/// relative tokens an unparseable heartbeat is never recent.
pub fn heartbeat_within(last_heartbeat: &str, token: RangeToken, now: NaiveDateTime) -> bool {
    let Some(span) = token.duration() else {
        return true;
    };
    match parse_wire(last_heartbeat) {
        Some(beat) => now - beat <= span,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(RangeToken::parse("1h"), RangeToken::OneHour);
        assert_eq!(RangeToken::parse(" 6H "), RangeToken::SixHours);
        assert_eq!(RangeToken::parse("24h"), RangeToken::TwentyFourHours);
        assert_eq!(RangeToken::parse("custom"), RangeToken::Full);
        assert_eq!(RangeToken::parse(""), RangeToken::Full);
    }

    #[test]
    fn test_default_is_six_hours() {
        assert_eq!(RangeToken::default(), RangeToken::SixHours);
    }

    #[test]
    fn test_resolve_24h() {
        let now = at(2024, 1, 2, 10, 0, 0).and_utc();
        let range = resolve_at(RangeToken::TwentyFourHours, &now);
        assert_eq!(range.start, "2024-01-01 10:00:00");
        assert_eq!(range.end, "2024-01-02 10:00:00");
    }

    #[test]
    fn test_resolve_is_zero_padded_and_truncated() {
        let now = at(2024, 3, 5, 7, 4, 9).and_utc() + TimeDelta::milliseconds(870);
        let range = resolve_at(RangeToken::OneHour, &now);
        assert_eq!(range.start, "2024-03-05 06:04:09");
        assert_eq!(range.end, "2024-03-05 07:04:09");
    }

    #[test]
    fn test_resolve_uses_the_given_zone() {
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = tz.from_utc_datetime(&at(2024, 1, 2, 0, 30, 0));
        let range = resolve_at(RangeToken::SixHours, &now);
        assert_eq!(range.end, "2024-01-02 06:00:00");
        assert_eq!(range.start, "2024-01-02 00:00:00");
    }

    #[test]
    fn test_full_history_starts_at_epoch() {
        let now = at(2024, 1, 2, 10, 0, 0).and_utc();
        let range = resolve_at(RangeToken::Full, &now);
        assert_eq!(range.start, "1970-01-01 00:00:00");
        assert_eq!(range.end, "2024-01-02 10:00:00");
    }

    #[test]
    fn test_parse_wire_variants() {
        let expected = at(2024, 1, 2, 9, 30, 0);
        assert_eq!(parse_wire("2024-01-02 09:30:00"), Some(expected));
        assert_eq!(parse_wire("2024-01-02T09:30:00"), Some(expected));
        assert_eq!(parse_wire("2024-01-02 09:30:00.250").map(|d| d.format("%H:%M").to_string()), Some("09:30".into()));
        assert_eq!(parse_wire("yesterday"), None);
        assert_eq!(parse_wire(""), None);
    }

    #[test]
    fn test_heartbeat_within() {
        let now = at(2024, 1, 2, 10, 0, 0);
        assert!(heartbeat_within("2024-01-02 09:30:00", RangeToken::OneHour, now));
        assert!(heartbeat_within("2024-01-02 09:00:00", RangeToken::OneHour, now));
        assert!(!heartbeat_within("2024-01-02 08:59:59", RangeToken::OneHour, now));
        assert!(heartbeat_within("2024-01-02 05:00:00", RangeToken::SixHours, now));
        assert!(!heartbeat_within("not a date", RangeToken::TwentyFourHours, now));
        assert!(heartbeat_within("not a date", RangeToken::Full, now));
    }

    #[test]
    fn test_token_cycle() {
        let mut token = RangeToken::OneHour;
        for _ in 0..RangeToken::ALL.len() {
            token = token.next();
        }
        assert_eq!(token, RangeToken::OneHour);
    }

    proptest! {
        #[test]
        fn one_hour_window_is_exactly_an_hour(secs in 86_400i64..4_000_000_000i64) {
            let now = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            let range = resolve_at(RangeToken::OneHour, &now);
            let start = NaiveDateTime::parse_from_str(&range.start, WIRE_DATETIME_FORMAT).unwrap();
            let end = NaiveDateTime::parse_from_str(&range.end, WIRE_DATETIME_FORMAT).unwrap();
            prop_assert_eq!((end - start).num_milliseconds(), 3_600_000);
        }
    }
}
