//! Lenient timestamp parsing for reading payloads.
//!
//! The history endpoint emits timestamps in whatever form its backing store
//! produces. Accepted inputs:
//!
//! | Input | Example | Interpretation |
//! |-------|---------|----------------|
//! | RFC 3339 | `2025-05-01T08:30:00+08:00` | as given |
//! | RFC 2822 | `Thu, 01 May 2025 08:30:00 +0000` | as given |
//! | Naive ISO-8601 | `2025-05-01T08:30:00.123456` | UTC |
//! | Naive, space separated | `2025-05-01 08:30:00` | UTC |
//! | Integer | `1746088200000` | Unix milliseconds |

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::{ParseError, ParseResult};

const NAIVE_FORMATS: [&[BorrowedFormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
];

/// Parse a timestamp string in any of the accepted formats.
///
/// # Examples
///
/// ```
/// use watermirror_types::parse_timestamp;
///
/// let a = parse_timestamp("2025-05-01T08:30:00Z").unwrap();
/// let b = parse_timestamp("2025-05-01 08:30:00").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_timestamp("yesterday").is_err());
/// ```
pub fn parse_timestamp(s: &str) -> ParseResult<OffsetDateTime> {
    let s = s.trim();

    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(dt);
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc2822) {
        return Ok(dt);
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = PrimitiveDateTime::parse(s, format) {
            return Ok(dt.assume_utc());
        }
    }

    Err(ParseError::InvalidTimestamp(s.to_string()))
}

/// Convert Unix milliseconds to a UTC timestamp.
pub fn from_unix_millis(millis: i64) -> ParseResult<OffsetDateTime> {
    let nanos = i128::from(millis) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|_| ParseError::TimestampOutOfRange(i128::from(millis)))
}

/// Serde adapter: serializes as RFC 3339, deserializes leniently.
///
/// Use with `#[serde(with = "watermirror_types::timestamp::lenient")]`.
#[cfg(feature = "serde")]
pub mod lenient {
    use core::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    pub fn serialize<S: Serializer>(
        value: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let text = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }

    struct TimestampVisitor;

    impl Visitor<'_> for TimestampVisitor {
        type Value = OffsetDateTime;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a date-time string or Unix milliseconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            super::parse_timestamp(v).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            super::from_unix_millis(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            let millis = i64::try_from(v)
                .map_err(|_| E::custom(format!("timestamp {} out of range", v)))?;
            super::from_unix_millis(millis).map_err(E::custom)
        }
    }
}
