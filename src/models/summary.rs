use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MortalityRatio — deaths as a percentage of confirmed cases
// ---------------------------------------------------------------------------

/// A mortality percentage, or `Undefined` when nothing was confirmed.
///
/// Serializes as a number or `null`, never as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum MortalityRatio {
    Percent(f64),
    Undefined,
}

impl MortalityRatio {
    pub fn percent(self) -> Option<f64> {
        match self {
            MortalityRatio::Percent(p) => Some(p),
            MortalityRatio::Undefined => None,
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, MortalityRatio::Undefined)
    }
}

impl From<Option<f64>> for MortalityRatio {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(p) if p.is_finite() => MortalityRatio::Percent(p),
            _ => MortalityRatio::Undefined,
        }
    }
}

impl From<MortalityRatio> for Option<f64> {
    fn from(ratio: MortalityRatio) -> Self {
        ratio.percent()
    }
}

// ---------------------------------------------------------------------------
// Aggregates — country vs. worldwide totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Aggregates {
    pub country: String,
    pub confirmed: f64,
    pub deaths: f64,
    pub mortality: MortalityRatio,
    pub global_confirmed: f64,
    pub global_deaths: f64,
    pub global_mortality: MortalityRatio,
}
