//! Platform-agnostic types for WaterMirror water-quality readings.
//!
//! This crate provides the shared data model used by the classification
//! engine, the history synchroniser, and any front-end that renders them.
//!
//! # Features
//!
//! - [`Reading`]: one timestamped sample of temperature, pH, conductivity,
//!   dissolved oxygen, and quality score
//! - [`Parameter`] and [`Level`]: the five measured parameters and their
//!   ordinal quality scales
//! - Lenient timestamp parsing for the history endpoint's payloads
//!
//! # Example
//!
//! ```
//! use watermirror_types::{Level, Parameter, Reading};
//!
//! let json = r#"{"timestamp": "2025-05-01 08:30:00", "temperature": 21.5, "Do": 7.2}"#;
//! let reading: Reading = serde_json::from_str(json).unwrap();
//! assert_eq!(reading.value(Parameter::DissolvedOxygen), Some(7.2));
//! assert_eq!(reading.ph, None);
//! assert_eq!(Level::Cold.rank(Parameter::Temperature), Some(0));
//! ```

pub mod error;
pub mod timestamp;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use timestamp::{from_unix_millis, parse_timestamp};
pub use types::{Level, Parameter, Reading, ReadingBuilder};

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    // --- Reading deserialization tests ---

    #[test]
    fn test_deserialize_full_reading() {
        let json = r#"{
            "timestamp": "2025-05-01T08:30:00Z",
            "temperature": 20.0,
            "ph": 7.0,
            "ec": 300,
            "Do": 7.0,
            "score": 85
        }"#;

        let reading: Reading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.timestamp, datetime!(2025-05-01 08:30:00 UTC));
        assert_eq!(reading.temperature, Some(20.0));
        assert_eq!(reading.ph, Some(7.0));
        assert_eq!(reading.ec, Some(300.0));
        assert_eq!(reading.dissolved_oxygen, Some(7.0));
        assert_eq!(reading.score, Some(85.0));
    }

    #[test]
    fn test_deserialize_nulls_and_missing_fields() {
        let json = r#"{"timestamp": "2025-05-01 08:30:00", "temperature": null, "score": 12.5}"#;

        let reading: Reading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.temperature, None);
        assert_eq!(reading.ph, None);
        assert_eq!(reading.ec, None);
        assert_eq!(reading.dissolved_oxygen, None);
        assert_eq!(reading.score, Some(12.5));
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let json = r#"{"id": 42, "timestamp": "2025-05-01 08:30:00", "device": "tank-1"}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading, Reading::empty(datetime!(2025-05-01 08:30:00 UTC)));
    }

    #[test]
    fn test_deserialize_millisecond_timestamp() {
        let json = r#"{"timestamp": 1000}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.timestamp.unix_timestamp(), 1);
    }

    #[test]
    fn test_deserialize_rejects_missing_timestamp() {
        let json = r#"{"temperature": 20.0}"#;
        assert!(serde_json::from_str::<Reading>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_bad_timestamp() {
        let json = r#"{"timestamp": "someday"}"#;
        let err = serde_json::from_str::<Reading>(json).unwrap_err();
        assert!(err.to_string().contains("someday"));
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let reading = Reading::builder(datetime!(2025-05-01 08:30:00 UTC))
            .dissolved_oxygen(6.0)
            .build();

        let value = serde_json::to_value(reading).unwrap();

        assert_eq!(value["Do"], 6.0);
        assert_eq!(value["timestamp"], "2025-05-01T08:30:00Z");
        assert!(value["ph"].is_null());
    }

    // --- Parameter tests ---

    #[test]
    fn test_parameter_canonical_order() {
        let mut sorted = Parameter::ALL;
        sorted.sort();
        assert_eq!(sorted, Parameter::ALL);
        assert_eq!(Parameter::ALL[0], Parameter::Temperature);
        assert_eq!(Parameter::ALL[4], Parameter::Score);
    }

    #[test]
    fn test_parameter_value_of() {
        let reading = Reading::builder(datetime!(2025-05-01 08:30:00 UTC))
            .temperature(1.0)
            .ph(2.0)
            .ec(3.0)
            .dissolved_oxygen(4.0)
            .score(5.0)
            .build();

        let values: Vec<_> = Parameter::ALL
            .iter()
            .map(|p| p.value_of(&reading))
            .collect();
        assert_eq!(
            values,
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]
        );
    }

    #[test]
    fn test_parameter_units() {
        assert_eq!(Parameter::Temperature.unit(), Some("°C"));
        assert_eq!(Parameter::Ph.unit(), None);
        assert_eq!(Parameter::Score.unit(), None);
    }

    #[test]
    fn test_parameter_serde_names() {
        let json = serde_json::to_string(&Parameter::DissolvedOxygen).unwrap();
        assert_eq!(json, "\"dissolved_oxygen\"");
    }

    // --- Level tests ---

    #[test]
    fn test_level_scales_exclude_unknown() {
        for parameter in Parameter::ALL {
            assert!(!parameter.levels().contains(&Level::Unknown));
            assert_eq!(Level::Unknown.rank(parameter), None);
        }
    }

    #[test]
    fn test_level_rank() {
        assert_eq!(Level::Good.rank(Parameter::Ec), Some(0));
        assert_eq!(Level::Good.rank(Parameter::Score), Some(4));
        assert_eq!(Level::Excellent.rank(Parameter::Score), Some(5));
        assert_eq!(Level::Acid.rank(Parameter::Temperature), None);
    }

    #[test]
    fn test_level_labels_match_serde() {
        for level in [Level::Unknown, Level::ReallyBad, Level::Normal, Level::Excellent] {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.label()));
        }
    }

    #[test]
    fn test_level_default_is_unknown() {
        assert_eq!(Level::default(), Level::Unknown);
        assert!(!Level::Unknown.is_known());
        assert!(Level::Normal.is_known());
    }

    #[test]
    fn test_level_display() {
        assert_eq!(Level::ReallyBad.to_string(), "Really bad");
        assert_eq!(Level::Acid.to_string(), "Acidic");
    }
}
