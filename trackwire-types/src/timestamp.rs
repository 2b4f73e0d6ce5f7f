//! Frame timestamp handling
//!
//! Tracker frames carry UTC timestamps as `yymmddHHMMSS`. Devices in the
//! field occasionally emit garbage in that slot (cold GPS start, clock not
//! yet set), so a value that does not parse is preserved verbatim instead
//! of being rejected.

use std::fmt;

use chrono::NaiveDateTime;

/// Wire format for frame timestamps
pub const WIRE_FORMAT: &str = "%y%m%d%H%M%S";

/// A frame timestamp, parsed when possible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameTimestamp {
    /// Successfully parsed UTC timestamp
    Utc(NaiveDateTime),

    /// Raw field value that did not parse as `yymmddHHMMSS`
    Unparsed(String),
}

impl FrameTimestamp {
    /// Parse a raw timestamp field
    ///
    /// Never fails: a malformed value is carried through as
    /// [`FrameTimestamp::Unparsed`].
    pub fn parse(raw: &str) -> Self {
        match NaiveDateTime::parse_from_str(raw, WIRE_FORMAT) {
            Ok(dt) => Self::Utc(dt),
            Err(_) => Self::Unparsed(raw.to_string()),
        }
    }

    /// Render back to the `yymmddHHMMSS` wire form
    pub fn to_wire(&self) -> String {
        match self {
            Self::Utc(dt) => dt.format(WIRE_FORMAT).to_string(),
            Self::Unparsed(raw) => raw.clone(),
        }
    }

    /// Whether the timestamp parsed as a real date
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Utc(_))
    }
}

impl fmt::Display for FrameTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Unparsed(raw) => write!(f, "{raw} (unparsed)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_parse_valid() {
        let ts = FrameTimestamp::parse("250311222802");
        match ts {
            FrameTimestamp::Utc(dt) => {
                assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
                assert_eq!(dt.hour(), 22);
                assert_eq!(dt.minute(), 28);
                assert_eq!(dt.second(), 2);
            }
            other => panic!("expected parsed timestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_garbage_preserved() {
        let ts = FrameTimestamp::parse("not-a-date");
        assert!(!ts.is_parsed());
        assert_eq!(ts.to_wire(), "not-a-date");
    }

    #[test]
    fn test_wire_round_trip() {
        let ts = FrameTimestamp::parse("250101120000");
        assert!(ts.is_parsed());
        assert_eq!(ts.to_wire(), "250101120000");
    }

    #[test]
    fn test_month_out_of_range() {
        // Month 13 is structurally shaped right but not a date
        let ts = FrameTimestamp::parse("251301120000");
        assert!(!ts.is_parsed());
        assert_eq!(ts.to_wire(), "251301120000");
    }
}
