//! Aggregate score report.
//!
//! The report view summarises a reading by placing its score in one of five
//! coarse bands and listing every advisory for the reading. The bands are a
//! display grouping only; the score's [`Level`] still comes from the shared
//! classifier, so a score of 90 is reported in the `80-100` band with level
//! `Good`.

use std::fmt;

use serde::Serialize;

use watermirror_types::{Level, Parameter, Reading};

use crate::advisory::{Advisory, advise_for_reading};
use crate::transform::{ClassifiedParameter, ReadingTransformer};

/// Coarse score bands shown on the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// `< 0`
    ReallyBad,
    /// `0-44`
    Poor,
    /// `45-64`
    Marginal,
    /// `65-79`
    Fair,
    /// `80-100`
    Good,
}

impl ScoreBand {
    /// All bands, lowest first.
    pub const ALL: [ScoreBand; 5] = [
        ScoreBand::ReallyBad,
        ScoreBand::Poor,
        ScoreBand::Marginal,
        ScoreBand::Fair,
        ScoreBand::Good,
    ];

    /// Band for a score. `None` when the score is missing or NaN.
    pub fn for_score(score: Option<f64>) -> Option<Self> {
        let score = score.filter(|s| !s.is_nan())?;
        let band = if score < 0.0 {
            ScoreBand::ReallyBad
        } else if score < 45.0 {
            ScoreBand::Poor
        } else if score < 65.0 {
            ScoreBand::Marginal
        } else if score < 80.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Good
        };
        Some(band)
    }

    /// Range label, e.g. `"45-64"`.
    pub fn range(&self) -> &'static str {
        match self {
            ScoreBand::ReallyBad => "<0",
            ScoreBand::Poor => "0-44",
            ScoreBand::Marginal => "45-64",
            ScoreBand::Fair => "65-79",
            ScoreBand::Good => "80-100",
        }
    }

    /// Status label.
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::ReallyBad => "Really bad",
            ScoreBand::Poor => "Poor",
            ScoreBand::Marginal => "Marginal",
            ScoreBand::Fair => "Fair",
            ScoreBand::Good => "Good",
        }
    }

    /// Share of surveyed water bodies falling in this band, in percent.
    pub fn reference_share(&self) -> f64 {
        match self {
            ScoreBand::ReallyBad => 15.6,
            ScoreBand::Poor => 58.0,
            ScoreBand::Marginal => 11.0,
            ScoreBand::Fair => 13.1,
            ScoreBand::Good => 2.4,
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score summary and full advisory list for one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub reading: Reading,
    pub score: Option<f64>,
    /// `None` when the reading has no score.
    pub band: Option<ScoreBand>,
    pub level: Level,
    pub parameters: Vec<ClassifiedParameter>,
    pub advisories: Vec<Advisory>,
}

impl ScoreReport {
    /// Build a report with the standard thresholds.
    pub fn new(reading: &Reading) -> Self {
        Self::with_transformer(reading, &ReadingTransformer::default())
    }

    /// Build a report using a specific transformer.
    pub fn with_transformer(reading: &Reading, transformer: &ReadingTransformer) -> Self {
        let parameters = transformer.classify(reading);
        let advisories = advise_for_reading(&parameters);
        let level = parameters
            .iter()
            .find(|p| p.parameter == Parameter::Score)
            .map(|p| p.level)
            .unwrap_or_default();

        Self {
            reading: *reading,
            score: reading.score,
            band: ScoreBand::for_score(reading.score),
            level,
            parameters,
            advisories,
        }
    }

    /// One-line summary of where the score sits.
    pub fn summary(&self) -> String {
        match (self.score, self.band) {
            (Some(score), Some(band)) => format!(
                "Water quality score {} is in the {} band, status \"{}\"",
                score,
                band.range(),
                band
            ),
            _ => "Water quality score unavailable".to_string(),
        }
    }
}
