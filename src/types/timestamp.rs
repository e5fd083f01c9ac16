// src/types/timestamp.rs
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// Recording time as stored in the info block.
///
/// Recorders write either a zoned ISO-8601 time or a local time without an
/// offset, and the two are kept apart so the text can be reproduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
}

impl Timestamp {
    const ZONED_FORMATS: [&'static str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
    const LOCAL_FORMATS: [&'static str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    /// Current local time, truncated to milliseconds.
    pub fn now() -> Self {
        let now = chrono::Local::now().naive_local();
        let truncated = now
            .with_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
            .unwrap_or(now);
        Timestamp::Local(truncated)
    }

    pub fn naive(&self) -> NaiveDateTime {
        match self {
            Timestamp::Zoned(dt) => dt.naive_local(),
            Timestamp::Local(dt) => *dt,
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Timestamp::Zoned(dt) => Some(*dt.offset()),
            Timestamp::Local(_) => None,
        }
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Timestamp::Zoned(dt)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Timestamp::Local(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_date_recorded(self))
    }
}

/// Parse the info block's date text.
///
/// Accepts RFC 3339 and the common ISO-8601 variants with or without an
/// offset, a `T` or space separator and an optional fraction. A bare date
/// is taken as local midnight. Returns `None` for anything else.
pub fn parse_date_recorded(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Timestamp::Zoned(dt));
    }
    for format in Timestamp::ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(Timestamp::Zoned(dt));
        }
    }
    for format in Timestamp::LOCAL_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Timestamp::Local(dt));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Timestamp::Local)
}

/// ISO-8601 text with millisecond precision, e.g. `2017-03-01T12:34:56.789+01:00`.
pub fn format_date_recorded(timestamp: &Timestamp) -> String {
    match timestamp {
        Timestamp::Zoned(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
        Timestamp::Local(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
    }
}

/// The info block's date field: the stored text plus its parsed form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateRecorded {
    text: String,
    timestamp: Option<Timestamp>,
}

impl DateRecorded {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let timestamp = parse_date_recorded(&text);
        DateRecorded { text, timestamp }
    }

    pub fn from_timestamp(timestamp: Timestamp) -> Self {
        DateRecorded {
            text: format_date_recorded(&timestamp),
            timestamp: Some(timestamp),
        }
    }

    pub fn now() -> Self {
        Self::from_timestamp(Timestamp::now())
    }

    /// The text written to and read from the file.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `None` when the text is not a recognised date.
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }
}

impl From<Timestamp> for DateRecorded {
    fn from(timestamp: Timestamp) -> Self {
        DateRecorded::from_timestamp(timestamp)
    }
}

impl From<&str> for DateRecorded {
    fn from(text: &str) -> Self {
        DateRecorded::from_text(text)
    }
}

impl From<String> for DateRecorded {
    fn from(text: String) -> Self {
        DateRecorded::from_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    #[test]
    fn test_parse_local_iso() {
        let ts = parse_date_recorded("2017-03-01T12:34:56.789").unwrap();
        assert_eq!(ts, Timestamp::Local(local(2017, 3, 1, 12, 34, 56, 789)));
        assert_eq!(ts.offset(), None);
    }

    #[test]
    fn test_parse_zoned_iso() {
        let ts = parse_date_recorded("2017-03-01T12:34:56.789-08:00").unwrap();
        let offset = FixedOffset::west_opt(8 * 3600).unwrap();
        let expected = offset.from_local_datetime(&local(2017, 3, 1, 12, 34, 56, 789)).unwrap();
        assert_eq!(ts, Timestamp::Zoned(expected));

        let utc = parse_date_recorded("2017-03-01T12:34:56Z").unwrap();
        assert_eq!(utc.offset(), FixedOffset::east_opt(0));
    }

    #[test]
    fn test_parse_variants() {
        assert!(parse_date_recorded("2017-03-01 12:34:56").is_some());
        assert!(parse_date_recorded("2017-03-01T12:34:56").is_some());
        assert_eq!(
            parse_date_recorded("2017-03-01").unwrap().naive(),
            local(2017, 3, 1, 0, 0, 0, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date_recorded(""), None);
        assert_eq!(parse_date_recorded("DATE_RECORDED"), None);
        assert_eq!(parse_date_recorded("2017-13-45"), None);
    }

    #[test]
    fn test_format_roundtrip() {
        for text in [
            "2017-03-01T12:34:56.789",
            "2017-03-01T12:34:56.000+00:00",
            "2020-12-31T23:59:59.999-05:30",
        ] {
            let ts = parse_date_recorded(text).unwrap();
            assert_eq!(format_date_recorded(&ts), text);
        }
    }

    #[test]
    fn test_date_recorded_keeps_text() {
        let date = DateRecorded::from_text("2017-03-01T12:34:56Z");
        assert_eq!(date.text(), "2017-03-01T12:34:56Z");
        assert!(date.timestamp().is_some());

        let date = DateRecorded::from_text("DATE_RECORDED");
        assert_eq!(date.text(), "DATE_RECORDED");
        assert_eq!(date.timestamp(), None);

        let ts = Timestamp::Local(local(2019, 6, 1, 8, 0, 0, 5));
        let date = DateRecorded::from(ts);
        assert_eq!(date.text(), "2019-06-01T08:00:00.005");
        assert_eq!(date.timestamp(), Some(ts));
    }

    #[test]
    fn test_now_is_millisecond_precision() {
        let ts = Timestamp::now();
        assert_eq!(ts.naive().nanosecond() % 1_000_000, 0);
        let text = format_date_recorded(&ts);
        assert_eq!(parse_date_recorded(&text), Some(ts));
    }
}
