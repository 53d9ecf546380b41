use std::fmt;

use time::{
    format_description::{well_known::Rfc3339, BorrowedFormatItem},
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime,
};

const NAIVE_DATE_TIME: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const NAIVE_DATE_TIME_SPACE: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const NAIVE_DATE_TIME_SUBSEC: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
const DATE_ONLY: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A point in time, always normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub const fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }

    pub const fn unix_timestamp(&self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn from_unix_timestamp(seconds: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(seconds).ok().map(Self)
    }

    /// Parse an ISO 8601 timestamp.
    ///
    /// Accepts RFC 3339, naive date times (interpreted as UTC)
    /// and bare dates (midnight UTC).
    pub fn parse_iso(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
            return Some(dt.into());
        }
        for format in [NAIVE_DATE_TIME, NAIVE_DATE_TIME_SPACE, NAIVE_DATE_TIME_SUBSEC] {
            if let Ok(dt) = PrimitiveDateTime::parse(s, format) {
                return Some(Self(dt.assume_utc()));
            }
        }
        Date::parse(s, DATE_ONLY)
            .ok()
            .map(|date| Self(date.midnight().assume_utc()))
    }

    pub fn to_rfc3339(&self) -> String {
        // Formatting a UTC date time as RFC 3339 only fails for years
        // outside of 0..=9999 which cannot be parsed in the first place.
        self.0.format(&Rfc3339).unwrap_or_else(|_| self.0.to_string())
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(from: OffsetDateTime) -> Self {
        Self(from.to_offset(time::UtcOffset::UTC))
    }
}

impl From<Timestamp> for OffsetDateTime {
    fn from(from: Timestamp) -> Self {
        from.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rfc3339_and_normalize_to_utc() {
        let ts = Timestamp::parse_iso("2024-03-08T10:00:00+05:30").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-08T04:30:00Z");
    }

    #[test]
    fn parse_naive_date_times_as_utc() {
        let ts = Timestamp::parse_iso("2024-03-08T10:00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-08T10:00:00Z");
        let ts = Timestamp::parse_iso("2024-03-08 10:00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-08T10:00:00Z");
        assert!(Timestamp::parse_iso("2024-03-08T10:00:00.250").is_some());
    }

    #[test]
    fn parse_bare_dates() {
        let ts = Timestamp::parse_iso("2024-11-15").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-11-15T00:00:00Z");
    }

    #[test]
    fn reject_garbage() {
        assert!(Timestamp::parse_iso("").is_none());
        assert!(Timestamp::parse_iso("every morning").is_none());
        assert!(Timestamp::parse_iso("2024-13-40").is_none());
    }

    #[test]
    fn convert_from_into_unix_timestamp() {
        let t1 = Timestamp::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(t1.unix_timestamp(), 1_700_000_000);
    }
}
