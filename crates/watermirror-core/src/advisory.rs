//! Natural-language advisories for classified readings.
//!
//! Advisories come from a fixed table keyed by `(Parameter, Level)`.
//! [`Level::Unknown`], and any level that is not on the parameter's scale,
//! has no entry and yields no advisory.

use std::fmt;

use serde::Serialize;

use watermirror_types::{Level, Parameter};

use crate::transform::ClassifiedParameter;

/// A fixed recommendation tied to one parameter at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Advisory {
    /// The parameter the advice is about.
    pub parameter: Parameter,
    /// The level that triggered it.
    pub level: Level,
    /// The advice itself.
    pub text: &'static str,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

fn tip(parameter: Parameter, level: Level) -> Option<&'static str> {
    use Level::*;
    use Parameter::*;

    let text = match (parameter, level) {
        (Temperature, Cold) => {
            "Water temperature is low; consider more sunlight or a heater."
        }
        (Temperature, Normal) => "Water temperature is normal; no adjustment needed.",
        (Temperature, Hot) => "Water temperature is high; keep it ventilated or add shade.",

        (Ph, Acid) => "pH is acidic; avoid adding too many acidic substances.",
        (Ph, Normal) => "pH is normal; no adjustment needed.",
        (Ph, Alkaline) => "pH is alkaline; consider adding a suitable acidic buffer.",

        (Ec, Good) => "Conductivity is low; add minerals if necessary.",
        (Ec, Normal) => "Conductivity is normal; no adjustment needed.",
        (Ec, Bad) => "Conductivity is too high; replace part of the water to reduce salinity.",

        (DissolvedOxygen, Good) => {
            "Dissolved oxygen is low; use an air pump to raise the oxygen level."
        }
        (DissolvedOxygen, Normal) => "Dissolved oxygen is normal; no adjustment needed.",
        (DissolvedOxygen, Bad) => {
            "Dissolved oxygen is too high; check whether the water is over-aerated."
        }

        (Score, ReallyBad) => "Water quality is extremely poor; replace the water immediately.",
        (Score, Poor) => "Water quality is unsuitable for any use.",
        (Score, Marginal) => {
            "Water quality is often threatened or impaired; conditions often depart from natural or desirable levels."
        }
        (Score, Fair) => {
            "Water quality conditions sometimes depart from natural or desirable levels."
        }
        (Score, Good) => "Water quality departs from natural or desirable levels.",
        (Score, Excellent) => "Water quality is at natural levels.",

        _ => return None,
    };
    Some(text)
}

/// Look up the advisory for one parameter at one level.
///
/// ```
/// use watermirror_core::{advise_for, Level, Parameter};
///
/// assert!(advise_for(Parameter::Ph, Level::Acid).is_some());
/// assert!(advise_for(Parameter::Ph, Level::Unknown).is_none());
/// assert!(advise_for(Parameter::Ph, Level::Hot).is_none());
/// ```
pub fn advise_for(parameter: Parameter, level: Level) -> Option<Advisory> {
    tip(parameter, level).map(|text| Advisory {
        parameter,
        level,
        text,
    })
}

/// Advisories for a set of `(parameter, level)` pairs.
///
/// Output follows the canonical parameter order regardless of input order;
/// each parameter contributes at most one advisory (its first occurrence).
pub fn advise_for_levels(levels: &[(Parameter, Level)]) -> Vec<Advisory> {
    Parameter::ALL
        .iter()
        .filter_map(|p| levels.iter().find(|(param, _)| param == p))
        .filter_map(|(p, l)| advise_for(*p, *l))
        .collect()
}

/// Advisories for a fully classified reading, in canonical parameter order.
pub fn advise_for_reading(classified: &[ClassifiedParameter]) -> Vec<Advisory> {
    let levels: Vec<(Parameter, Level)> = classified
        .iter()
        .map(|c| (c.parameter, c.level))
        .collect();
    advise_for_levels(&levels)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use watermirror_types::Reading;

    use super::*;
    use crate::transform::ReadingTransformer;

    #[test]
    fn test_every_scale_level_has_advice() {
        for parameter in Parameter::ALL {
            for level in parameter.levels() {
                assert!(
                    advise_for(parameter, *level).is_some(),
                    "missing advice for {:?}/{:?}",
                    parameter,
                    level
                );
            }
        }
    }

    #[test]
    fn test_unknown_never_advises() {
        for parameter in Parameter::ALL {
            assert_eq!(advise_for(parameter, Level::Unknown), None);
        }
    }

    #[test]
    fn test_foreign_levels_do_not_advise() {
        assert_eq!(advise_for(Parameter::Temperature, Level::Acid), None);
        assert_eq!(advise_for(Parameter::Ec, Level::Excellent), None);
        assert_eq!(advise_for(Parameter::Score, Level::Normal), None);
    }

    #[test]
    fn test_low_ec_and_do_recommend_raising() {
        let ec = advise_for(Parameter::Ec, Level::Good).unwrap();
        assert!(ec.text.contains("low"));
        let dissolved = advise_for(Parameter::DissolvedOxygen, Level::Good).unwrap();
        assert!(dissolved.text.contains("raise"));
    }

    #[test]
    fn test_levels_are_emitted_in_canonical_order() {
        let levels = [
            (Parameter::Score, Level::Good),
            (Parameter::Temperature, Level::Hot),
            (Parameter::Ph, Level::Unknown),
        ];

        let advice = advise_for_levels(&levels);

        assert_eq!(advice.len(), 2);
        assert_eq!(advice[0].parameter, Parameter::Temperature);
        assert_eq!(advice[1].parameter, Parameter::Score);
    }

    #[test]
    fn test_duplicate_parameters_use_first() {
        let levels = [
            (Parameter::Ph, Level::Acid),
            (Parameter::Ph, Level::Alkaline),
        ];
        let advice = advise_for_levels(&levels);
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].level, Level::Acid);
    }

    #[test]
    fn test_typical_reading_advisory_texts() {
        let reading = Reading::builder(datetime!(2025-05-01 08:30:00 UTC))
            .temperature(20.0)
            .ph(7.0)
            .ec(300.0)
            .dissolved_oxygen(7.0)
            .score(85.0)
            .build();
        let classified = ReadingTransformer::default().classify(&reading);

        let texts: Vec<&str> = advise_for_reading(&classified)
            .iter()
            .map(|a| a.text)
            .collect();

        assert_eq!(
            texts,
            vec![
                "Water temperature is normal; no adjustment needed.",
                "pH is normal; no adjustment needed.",
                "Conductivity is normal; no adjustment needed.",
                "Dissolved oxygen is normal; no adjustment needed.",
                "Water quality departs from natural or desirable levels.",
            ]
        );
    }

    #[test]
    fn test_display_is_text() {
        let advice = advise_for(Parameter::Ph, Level::Normal).unwrap();
        assert_eq!(advice.to_string(), advice.text);
    }
}
