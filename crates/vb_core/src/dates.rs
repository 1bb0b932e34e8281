//! Date parsing and timestamp conversions for article records.
//!
//! Records carry dates in whatever shape the exporting system produced.
//! [`parse_datetime_string`] accepts the known shapes and normalizes them to a
//! `DateTime<FixedOffset>`; inputs without an offset are taken as UTC.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::types::DateInput;
use crate::{Error, Result};

/// Pattern used when rendering timestamps for humans and string-only targets.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    /// The string carries a `±HH:MM` offset.
    Offset,
    /// The string ends in a literal `Z`.
    Zulu,
    /// No zone information.
    Naive,
    /// Calendar date only; midnight is implied.
    DateOnly,
}

/// One accepted date shape.
#[derive(Debug, Clone, Copy)]
pub struct DateFormat {
    /// Pattern handed to the chrono parser.
    pub parse: &'static str,
    /// Pattern that renders a parsed value back into this shape.
    pub render: &'static str,
    fractional: bool,
    zone: Zone,
}

/// Accepted shapes, in the order they are tried. Several are prefixes of one
/// another, so the order decides which one wins.
pub const DATE_FORMATS: [DateFormat; 7] = [
    // 2025-10-16 14:09:00.000000 +00:00
    DateFormat {
        parse: "%Y-%m-%d %H:%M:%S%.f %:z",
        render: "%Y-%m-%d %H:%M:%S%.6f %:z",
        fractional: true,
        zone: Zone::Offset,
    },
    // 2025-10-16 14:09:00 +00:00
    DateFormat {
        parse: "%Y-%m-%d %H:%M:%S %:z",
        render: "%Y-%m-%d %H:%M:%S %:z",
        fractional: false,
        zone: Zone::Offset,
    },
    // 2025-10-16T14:09:00.000000Z
    DateFormat {
        parse: "%Y-%m-%dT%H:%M:%S%.fZ",
        render: "%Y-%m-%dT%H:%M:%S%.6fZ",
        fractional: true,
        zone: Zone::Zulu,
    },
    // 2025-10-16T14:09:00Z
    DateFormat {
        parse: "%Y-%m-%dT%H:%M:%SZ",
        render: "%Y-%m-%dT%H:%M:%SZ",
        fractional: false,
        zone: Zone::Zulu,
    },
    // 2025-10-16 14:09:00.000000
    DateFormat {
        parse: "%Y-%m-%d %H:%M:%S%.f",
        render: "%Y-%m-%d %H:%M:%S%.6f",
        fractional: true,
        zone: Zone::Naive,
    },
    // 2025-10-16 14:09:00
    DateFormat {
        parse: "%Y-%m-%d %H:%M:%S",
        render: "%Y-%m-%d %H:%M:%S",
        fractional: false,
        zone: Zone::Naive,
    },
    // 2025-10-16
    DateFormat {
        parse: "%Y-%m-%d",
        render: "%Y-%m-%d",
        fractional: false,
        zone: Zone::DateOnly,
    },
];

impl DateFormat {
    /// Parse `s` in exactly this shape.
    pub fn try_parse(&self, s: &str) -> Option<DateTime<FixedOffset>> {
        // `%.f` also matches an absent fraction; the fractional shapes require one.
        if self.fractional && !s.contains('.') {
            return None;
        }
        if !self.matches_layout(s) {
            return None;
        }
        match self.zone {
            Zone::Offset => DateTime::parse_from_str(s, self.parse).ok(),
            Zone::Zulu | Zone::Naive => NaiveDateTime::parse_from_str(s, self.parse)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset()),
            Zone::DateOnly => NaiveDate::parse_from_str(s, self.parse)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc().fixed_offset()),
        }
    }

    // chrono lets a pattern space match any run of whitespace, including none,
    // and skips whitespace before numbers. Whitespace must sit exactly where
    // the pattern puts a single space.
    fn matches_layout(&self, s: &str) -> bool {
        if s.chars().any(|c| c.is_whitespace() && c != ' ') || s.contains("  ") {
            return false;
        }
        if s.trim() != s || s.matches(' ').count() != self.parse.matches(' ').count() {
            return false;
        }
        match self.zone {
            Zone::DateOnly => true,
            // Byte 8 of the pattern is the separator after `%Y-%m-%d`.
            _ => s.as_bytes().get(10) == self.parse.as_bytes().get(8),
        }
    }

    /// Render `dt` back into this shape.
    pub fn render(&self, dt: &DateTime<FixedOffset>) -> String {
        dt.format(self.render).to_string()
    }
}

/// Parse a date string, returning the value and the shape that matched.
pub fn parse_with_format(s: &str) -> Result<(DateTime<FixedOffset>, &'static DateFormat)> {
    DATE_FORMATS
        .iter()
        .find_map(|format| format.try_parse(s).map(|dt| (dt, format)))
        .ok_or_else(|| Error::DateParse(s.to_string()))
}

/// Parse a date string in any of the accepted shapes.
pub fn parse_datetime_string(s: &str) -> Result<DateTime<FixedOffset>> {
    parse_with_format(s).map(|(dt, _)| dt)
}

/// Whole seconds since the Unix epoch, truncated toward zero.
pub fn datetime_to_timestamp(dt: &DateTime<FixedOffset>) -> i64 {
    let secs = dt.timestamp();
    if secs < 0 && dt.timestamp_subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

pub fn date_string_to_timestamp(s: &str) -> Result<i64> {
    parse_datetime_string(s).map(|dt| datetime_to_timestamp(&dt))
}

pub fn timestamp_to_datetime(timestamp: i64) -> Result<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| Error::DateParse(timestamp.to_string()))
}

/// Resolve any date input to a time value.
pub fn to_datetime(value: &DateInput) -> Result<DateTime<FixedOffset>> {
    match value {
        DateInput::Text(s) => parse_datetime_string(s),
        DateInput::Timestamp(ts) => timestamp_to_datetime(*ts),
        DateInput::DateTime(dt) => Ok(*dt),
    }
}

/// Render a time value with a strftime pattern, rejecting malformed patterns
/// instead of panicking inside the formatter.
pub fn format_datetime(dt: &DateTime<FixedOffset>, format: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(Error::InvalidDateFormat(format.to_string()));
    }
    Ok(dt.format_with_items(items.into_iter()).to_string())
}

/// Render a Unix timestamp in UTC.
pub fn timestamp_to_datetime_string(timestamp: i64, format: &str) -> Result<String> {
    format_datetime(&timestamp_to_datetime(timestamp)?, format)
}
