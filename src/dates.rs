//! Publish-date parsing for feed items.
//!
//! Feeds in the wild disagree on date formats, so a fixed list of layouts is
//! tried in order and the first one that fits wins.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unparseable date {0:?}")]
pub struct DateParseError(pub String);

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Copy)]
enum Layout {
    /// Trailing numeric offset, e.g. `-0700`
    NumericZone {
        weekday: bool,
        format: &'static str,
    },
    /// Trailing zone abbreviation, e.g. `GMT` or `PST`
    NamedZone {
        weekday: bool,
        format: &'static str,
    },
    Rfc3339,
    /// No zone at all; read as UTC
    NoZone {
        weekday: bool,
        format: &'static str,
    },
}

const LAYOUTS: [Layout; 6] = [
    // RFC1123Z: Mon, 02 Jan 2006 15:04:05 -0700
    Layout::NumericZone {
        weekday: true,
        format: "%d %b %Y %H:%M:%S %z",
    },
    // RFC1123: Mon, 02 Jan 2006 15:04:05 MST
    Layout::NamedZone {
        weekday: true,
        format: "%d %b %Y %H:%M:%S",
    },
    // RFC822Z: 02 Jan 06 15:04 -0700
    Layout::NumericZone {
        weekday: false,
        format: "%d %b %y %H:%M %z",
    },
    // RFC822: 02 Jan 06 15:04 MST
    Layout::NamedZone {
        weekday: false,
        format: "%d %b %y %H:%M",
    },
    Layout::Rfc3339,
    // Mon, 02 Jan 2006 15:04:05
    Layout::NoZone {
        weekday: true,
        format: "%d %b %Y %H:%M:%S",
    },
];

impl Layout {
    fn parse(self, value: &str) -> Option<DateTime<Utc>> {
        match self {
            Layout::NumericZone { weekday, format } => {
                let rest = strip_weekday(value, weekday)?;
                DateTime::parse_from_str(rest, format)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            Layout::NamedZone { weekday, format } => {
                let rest = strip_weekday(value, weekday)?;
                let (local, zone) = rest.rsplit_once(' ')?;
                let offset = zone_offset(zone)?;
                let naive = NaiveDateTime::parse_from_str(local, format).ok()?;
                offset
                    .from_local_datetime(&naive)
                    .single()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::NoZone { weekday, format } => {
                let rest = strip_weekday(value, weekday)?;
                NaiveDateTime::parse_from_str(rest, format)
                    .ok()
                    .map(|naive| naive.and_utc())
            }
        }
    }
}

/// Removes a leading `Mon, ` when the layout expects one. The weekday is not
/// checked against the date itself; plenty of feeds get it wrong.
fn strip_weekday(value: &str, weekday: bool) -> Option<&str> {
    if !weekday {
        return Some(value);
    }
    let (day, rest) = value.split_once(',')?;
    WEEKDAYS
        .iter()
        .any(|w| w.eq_ignore_ascii_case(day))
        .then_some(rest.trim_start())
}

/// Offset for an RFC 822 zone abbreviation. Unknown alphabetic zones are
/// read as UTC.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let hours = match zone.to_ascii_uppercase().as_str() {
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => 0,
    };
    FixedOffset::east_opt(hours * 3600)
}

/// Parses a feed item's publish date against the known layouts.
pub fn parse_pub_date(value: &str) -> Result<DateTime<Utc>, DateParseError> {
    let value = value.trim();
    LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(value))
        .ok_or_else(|| DateParseError(value.to_string()))
}

/// Same as [`parse_pub_date`], but falls back to the current time when no
/// layout matches. The failure is logged, never propagated.
pub fn pub_date_or_now(value: &str) -> DateTime<Utc> {
    parse_pub_date(value).unwrap_or_else(|e| {
        warn!("{}, using current time", e);
        Utc::now()
    })
}
