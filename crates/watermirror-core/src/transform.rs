//! Turning raw readings into display-ready classified parameters.
//!
//! Each [`ClassifiedParameter`] carries the raw value, its level, and the
//! parameter's fixed range table so a presentation layer can render the
//! whole scale with the current level highlighted.

use serde::Serialize;

use watermirror_types::{Level, Parameter, Reading};

use crate::error::{Error, Result};
use crate::thresholds::Thresholds;

/// One cell of a parameter's range table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayRange {
    /// Numeric range label, e.g. `"6.5-8.5"`.
    pub range: &'static str,
    /// Status label shown under the range, e.g. `"Neutral"`.
    pub status: &'static str,
    /// The level this cell represents.
    pub level: Level,
}

const fn cell(range: &'static str, status: &'static str, level: Level) -> DisplayRange {
    DisplayRange {
        range,
        status,
        level,
    }
}

const TEMPERATURE_RANGES: [DisplayRange; 3] = [
    cell("<15°C", "Cold", Level::Cold),
    cell("15-25°C", "Normal", Level::Normal),
    cell(">25°C", "Hot", Level::Hot),
];

const PH_RANGES: [DisplayRange; 3] = [
    cell("<6.5", "Acidic", Level::Acid),
    cell("6.5-8.5", "Neutral", Level::Normal),
    cell(">8.5", "Alkaline", Level::Alkaline),
];

const EC_RANGES: [DisplayRange; 3] = [
    cell("<200", "Low", Level::Good),
    cell("200-800", "Normal", Level::Normal),
    cell(">800", "High", Level::Bad),
];

const DO_RANGES: [DisplayRange; 3] = [
    cell("<6.5", "Low", Level::Good),
    cell("6.5-8", "Normal", Level::Normal),
    cell(">8", "High", Level::Bad),
];

const SCORE_RANGES: [DisplayRange; 6] = [
    cell("<0", "Really bad", Level::ReallyBad),
    cell("0-45", "Poor", Level::Poor),
    cell("45-65", "Marginal", Level::Marginal),
    cell("65-80", "Fair", Level::Fair),
    cell("80-95", "Good", Level::Good),
    cell(">=95", "Excellent", Level::Excellent),
];

/// The static range table for a parameter, lowest reading first.
pub fn display_ranges(parameter: Parameter) -> &'static [DisplayRange] {
    match parameter {
        Parameter::Temperature => &TEMPERATURE_RANGES,
        Parameter::Ph => &PH_RANGES,
        Parameter::Ec => &EC_RANGES,
        Parameter::DissolvedOxygen => &DO_RANGES,
        Parameter::Score => &SCORE_RANGES,
    }
}

/// A single parameter of a reading after classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedParameter {
    pub parameter: Parameter,
    /// The raw measurement, if one was reported.
    pub value: Option<f64>,
    pub level: Level,
    pub ranges: &'static [DisplayRange],
}

impl ClassifiedParameter {
    /// The range cell matching the current level, if any.
    pub fn current_range(&self) -> Option<&'static DisplayRange> {
        self.ranges.iter().find(|r| r.level == self.level)
    }

    /// The value with its unit, or `--` when missing.
    pub fn display_value(&self) -> String {
        match (self.value, self.parameter.unit()) {
            (Some(v), Some(unit)) => format!("{} {}", v, unit),
            (Some(v), None) => v.to_string(),
            (None, _) => "--".to_string(),
        }
    }
}

/// Builds classified parameter tables from raw readings.
#[derive(Debug, Clone, Default)]
pub struct ReadingTransformer {
    thresholds: Thresholds,
}

impl ReadingTransformer {
    /// Create a transformer that classifies with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Classify every parameter of one reading, in canonical order.
    pub fn classify(&self, reading: &Reading) -> Vec<ClassifiedParameter> {
        Parameter::ALL
            .iter()
            .map(|&parameter| {
                let value = parameter.value_of(reading);
                ClassifiedParameter {
                    parameter,
                    value,
                    level: self.thresholds.classify(parameter, value),
                    ranges: display_ranges(parameter),
                }
            })
            .collect()
    }

    /// Classify the most recent reading of a live-source payload.
    ///
    /// The payload is newest-first, so only its first element is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPayload`] when `readings` is empty.
    pub fn transform(&self, readings: &[Reading]) -> Result<Vec<ClassifiedParameter>> {
        let latest = readings.first().ok_or(Error::EmptyPayload)?;
        Ok(self.classify(latest))
    }
}

/// Classify the most recent reading with the standard thresholds.
pub fn transform(readings: &[Reading]) -> Result<Vec<ClassifiedParameter>> {
    ReadingTransformer::default().transform(readings)
}
