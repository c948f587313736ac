//! Water-quality thresholds and level classification.
//!
//! This module holds the single definition of every cutoff used to turn a
//! raw measurement into a [`Level`]. The live view, the history list, and
//! the aggregate report all classify through here.
//!
//! # Cutoffs
//!
//! | Parameter | Low | Normal | High |
//! |-----------|-----|--------|------|
//! | Temperature (°C) | `< 15` Cold | `15..=25` | `> 25` Hot |
//! | pH | `< 6.5` Acid | `6.5..=8.5` | `> 8.5` Alkaline |
//! | EC (µS/cm) | `< 200` Good | `200..=800` | `> 800` Bad |
//! | DO (mg/L) | `< 6.5` Good | `6.5..=8` | `> 8` Bad |
//!
//! Score: `< 0` ReallyBad, `< 45` Poor, `< 65` Marginal, `< 80` Fair,
//! `< 95` Good, otherwise Excellent.
//!
//! # Example
//!
//! ```
//! use watermirror_core::{classify, Level, Parameter};
//!
//! assert_eq!(classify(Parameter::Ph, Some(6.5)), Level::Normal);
//! assert_eq!(classify(Parameter::Ph, Some(6.499)), Level::Acid);
//! assert_eq!(classify(Parameter::Score, None), Level::Unknown);
//! ```

use serde::{Deserialize, Serialize};

use watermirror_types::{Level, Parameter};

/// A three-way band: below `low` is the low level, above `high` is the high
/// level, and both bounds belong to the normal range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Smallest value still classified as normal.
    pub low: f64,
    /// Largest value still classified as normal.
    pub high: f64,
}

impl Band {
    /// Create a band with inclusive normal bounds.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn classify(&self, value: f64, below: Level, above: Level) -> Level {
        if value < self.low {
            below
        } else if value <= self.high {
            Level::Normal
        } else {
            above
        }
    }
}

/// Score cutoffs. Each field is the exclusive upper bound of its level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCutoffs {
    /// Upper bound for ReallyBad.
    pub really_bad_below: f64,
    /// Upper bound for Poor.
    pub poor_below: f64,
    /// Upper bound for Marginal.
    pub marginal_below: f64,
    /// Upper bound for Fair.
    pub fair_below: f64,
    /// Upper bound for Good.
    pub good_below: f64,
    // At or above good_below is Excellent
}

impl Default for ScoreCutoffs {
    fn default() -> Self {
        DEFAULT_CONFIG.score
    }
}

/// Configuration for all parameter thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Temperature band in °C.
    pub temperature: Band,
    /// pH band.
    pub ph: Band,
    /// Conductivity band in µS/cm.
    pub ec: Band,
    /// Dissolved-oxygen band in mg/L.
    pub dissolved_oxygen: Band,
    /// Score cutoffs.
    pub score: ScoreCutoffs,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

const DEFAULT_CONFIG: ThresholdConfig = ThresholdConfig {
    temperature: Band::new(15.0, 25.0),
    ph: Band::new(6.5, 8.5),
    ec: Band::new(200.0, 800.0),
    dissolved_oxygen: Band::new(6.5, 8.0),
    score: ScoreCutoffs {
        really_bad_below: 0.0,
        poor_below: 45.0,
        marginal_below: 65.0,
        fair_below: 80.0,
        good_below: 95.0,
    },
};

static DEFAULT_THRESHOLDS: Thresholds = Thresholds {
    config: DEFAULT_CONFIG,
};

/// Threshold evaluator for water-quality readings.
#[derive(Debug, Clone, Default)]
pub struct Thresholds {
    config: ThresholdConfig,
}

impl Thresholds {
    /// Create a new threshold evaluator with the given configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// The shared evaluator with the standard cutoffs.
    pub fn standard() -> &'static Thresholds {
        &DEFAULT_THRESHOLDS
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Classify a single raw measurement.
    ///
    /// Total over all inputs: a missing value, and NaN, yield
    /// [`Level::Unknown`]; every other value (including infinities) lands on
    /// the parameter's scale.
    pub fn classify(&self, parameter: Parameter, value: Option<f64>) -> Level {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return Level::Unknown;
        };

        let c = &self.config;
        match parameter {
            Parameter::Temperature => c.temperature.classify(value, Level::Cold, Level::Hot),
            Parameter::Ph => c.ph.classify(value, Level::Acid, Level::Alkaline),
            Parameter::Ec => c.ec.classify(value, Level::Good, Level::Bad),
            Parameter::DissolvedOxygen => {
                c.dissolved_oxygen.classify(value, Level::Good, Level::Bad)
            }
            Parameter::Score => self.classify_score(value),
        }
    }

    fn classify_score(&self, score: f64) -> Level {
        let s = &self.config.score;
        if score < s.really_bad_below {
            Level::ReallyBad
        } else if score < s.poor_below {
            Level::Poor
        } else if score < s.marginal_below {
            Level::Marginal
        } else if score < s.fair_below {
            Level::Fair
        } else if score < s.good_below {
            Level::Good
        } else {
            Level::Excellent
        }
    }
}

/// Classify a raw measurement with the standard thresholds.
pub fn classify(parameter: Parameter, value: Option<f64>) -> Level {
    Thresholds::standard().classify(parameter, value)
}
