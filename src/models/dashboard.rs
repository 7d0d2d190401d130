use serde::{Deserialize, Serialize};

use super::trend::{Metric, TrendPoint};

// ---------------------------------------------------------------------------
// TrendChart — line chart of a smoothed daily series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrendChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub metric: Metric,
    pub country: String,
    pub window: usize,
    pub points: Vec<TrendPoint>,
}

// ---------------------------------------------------------------------------
// SummaryCard — one headline figure, country next to worldwide
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SummaryCard {
    pub header: String,
    pub value: String,
    pub worldwide: String,
}

// ---------------------------------------------------------------------------
// Selector options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPreset {
    pub value: usize,
    pub label: String,
}
