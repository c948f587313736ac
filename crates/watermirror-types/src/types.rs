//! Core types for water-quality sensor data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// A water-quality parameter reported by the sensor.
///
/// The declaration order is the canonical order used everywhere parameters
/// are listed (display tables, advisory aggregation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Parameter {
    /// Water temperature in degrees Celsius.
    Temperature,
    /// Acidity / alkalinity.
    Ph,
    /// Electrical conductivity in µS/cm.
    Ec,
    /// Dissolved oxygen in mg/L.
    DissolvedOxygen,
    /// Composite water-quality score computed by the sensor backend.
    Score,
}

impl Parameter {
    /// All parameters in canonical order.
    pub const ALL: [Parameter; 5] = [
        Parameter::Temperature,
        Parameter::Ph,
        Parameter::Ec,
        Parameter::DissolvedOxygen,
        Parameter::Score,
    ];

    /// Human-readable parameter name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Temperature => "Temperature",
            Parameter::Ph => "pH",
            Parameter::Ec => "Conductivity (EC)",
            Parameter::DissolvedOxygen => "Dissolved oxygen (DO)",
            Parameter::Score => "Water quality score",
        }
    }

    /// Unit suffix for display, if the parameter has one.
    #[must_use]
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Parameter::Temperature => Some("°C"),
            Parameter::Ec => Some("µS/cm"),
            Parameter::DissolvedOxygen => Some("mg/L"),
            Parameter::Ph | Parameter::Score => None,
        }
    }

    /// The levels this parameter can be classified into, lowest reading first.
    ///
    /// [`Level::Unknown`] is never part of the scale.
    #[must_use]
    pub fn levels(&self) -> &'static [Level] {
        match self {
            Parameter::Temperature => &[Level::Cold, Level::Normal, Level::Hot],
            Parameter::Ph => &[Level::Acid, Level::Normal, Level::Alkaline],
            Parameter::Ec | Parameter::DissolvedOxygen => &[Level::Good, Level::Normal, Level::Bad],
            Parameter::Score => &[
                Level::ReallyBad,
                Level::Poor,
                Level::Marginal,
                Level::Fair,
                Level::Good,
                Level::Excellent,
            ],
        }
    }

    /// Extract this parameter's raw value from a reading.
    #[must_use]
    pub fn value_of(&self, reading: &Reading) -> Option<f64> {
        match self {
            Parameter::Temperature => reading.temperature,
            Parameter::Ph => reading.ph,
            Parameter::Ec => reading.ec,
            Parameter::DissolvedOxygen => reading.dissolved_oxygen,
            Parameter::Score => reading.score,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = ParseError;

    /// Parse a parameter from its wire or short name (case-insensitive).
    ///
    /// ```
    /// use watermirror_types::Parameter;
    ///
    /// assert_eq!("Do".parse::<Parameter>(), Ok(Parameter::DissolvedOxygen));
    /// assert_eq!("ph".parse::<Parameter>(), Ok(Parameter::Ph));
    /// assert!("co2".parse::<Parameter>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temperature" | "temp" => Ok(Parameter::Temperature),
            "ph" => Ok(Parameter::Ph),
            "ec" | "conductivity" => Ok(Parameter::Ec),
            "do" | "dissolved_oxygen" | "dissolvedoxygen" => Ok(Parameter::DissolvedOxygen),
            "score" => Ok(Parameter::Score),
            _ => Err(ParseError::UnknownParameter(s.to_string())),
        }
    }
}

/// Ordinal quality level of a single measurement.
///
/// Levels are parameter-specific; see [`Parameter::levels`] for the scale of
/// each parameter. The same variant may appear on more than one scale
/// (`Normal`, `Good`), so a level is only meaningful together with its
/// parameter.
///
/// For conductivity and dissolved oxygen, [`Level::Good`] denotes a *low*
/// reading and [`Level::Bad`] a *high* one. The naming is kept as the
/// sensor's operators know it even though a low reading is not an
/// improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Level {
    /// No value was reported.
    #[default]
    Unknown,
    Cold,
    Normal,
    Hot,
    Acid,
    Alkaline,
    Good,
    Bad,
    ReallyBad,
    Poor,
    Marginal,
    Fair,
    Excellent,
}

impl Level {
    /// Whether this level came from an actual measurement.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Level::Unknown)
    }

    /// Position of this level on `parameter`'s scale (0 = lowest reading).
    ///
    /// Returns `None` for [`Level::Unknown`] and for levels that do not
    /// belong to the parameter.
    #[must_use]
    pub fn rank(&self, parameter: Parameter) -> Option<usize> {
        parameter.levels().iter().position(|l| l == self)
    }

    /// Short machine-friendly label, matching the serde representation.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Level::Unknown => "unknown",
            Level::Cold => "cold",
            Level::Normal => "normal",
            Level::Hot => "hot",
            Level::Acid => "acid",
            Level::Alkaline => "alkaline",
            Level::Good => "good",
            Level::Bad => "bad",
            Level::ReallyBad => "really_bad",
            Level::Poor => "poor",
            Level::Marginal => "marginal",
            Level::Fair => "fair",
            Level::Excellent => "excellent",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Level::Unknown => "Unknown",
            Level::Cold => "Cold",
            Level::Normal => "Normal",
            Level::Hot => "Hot",
            Level::Acid => "Acidic",
            Level::Alkaline => "Alkaline",
            Level::Good => "Good",
            Level::Bad => "Bad",
            Level::ReallyBad => "Really bad",
            Level::Poor => "Poor",
            Level::Marginal => "Marginal",
            Level::Fair => "Fair",
            Level::Excellent => "Excellent",
        };
        f.write_str(text)
    }
}

/// One sampled observation from the water-quality sensor.
///
/// Every measurement is optional: the backend reports `null` for a sensor
/// that produced no value. The dissolved-oxygen field is named `Do` on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// When the observation was sampled.
    #[cfg_attr(feature = "serde", serde(with = "crate::timestamp::lenient"))]
    pub timestamp: OffsetDateTime,
    /// Water temperature in °C.
    #[cfg_attr(feature = "serde", serde(default))]
    pub temperature: Option<f64>,
    /// pH.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ph: Option<f64>,
    /// Electrical conductivity in µS/cm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ec: Option<f64>,
    /// Dissolved oxygen in mg/L.
    #[cfg_attr(feature = "serde", serde(default, rename = "Do"))]
    pub dissolved_oxygen: Option<f64>,
    /// Composite quality score.
    #[cfg_attr(feature = "serde", serde(default))]
    pub score: Option<f64>,
}

impl Reading {
    /// Create a reading with no measurements at the given time.
    #[must_use]
    pub fn empty(timestamp: OffsetDateTime) -> Self {
        Self {
            timestamp,
            temperature: None,
            ph: None,
            ec: None,
            dissolved_oxygen: None,
            score: None,
        }
    }

    /// Create a builder for constructing a `Reading`.
    pub fn builder(timestamp: OffsetDateTime) -> ReadingBuilder {
        ReadingBuilder {
            reading: Self::empty(timestamp),
        }
    }

    /// Value of a single parameter.
    #[must_use]
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        parameter.value_of(self)
    }
}

/// Builder for [`Reading`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ReadingBuilder {
    reading: Reading,
}

impl ReadingBuilder {
    /// Set the temperature in °C.
    pub fn temperature(mut self, value: f64) -> Self {
        self.reading.temperature = Some(value);
        self
    }

    /// Set the pH.
    pub fn ph(mut self, value: f64) -> Self {
        self.reading.ph = Some(value);
        self
    }

    /// Set the conductivity.
    pub fn ec(mut self, value: f64) -> Self {
        self.reading.ec = Some(value);
        self
    }

    /// Set the dissolved oxygen.
    pub fn dissolved_oxygen(mut self, value: f64) -> Self {
        self.reading.dissolved_oxygen = Some(value);
        self
    }

    /// Set the quality score.
    pub fn score(mut self, value: f64) -> Self {
        self.reading.score = Some(value);
        self
    }

    /// Build the reading.
    pub fn build(self) -> Reading {
        self.reading
    }
}
