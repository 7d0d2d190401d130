//! Smoothed daily trend queries.

use crate::aggregate;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::{CountryTrend, Metric};

// ---------------------------------------------------------------------------
// TrendQuery
// ---------------------------------------------------------------------------

/// Query interface for per-country daily trends.
pub struct TrendQuery<'a> {
    dataset: &'a Dataset,
}

impl<'a> TrendQuery<'a> {
    /// Create a new `TrendQuery` bound to the given dataset.
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Smoothed new-per-day series for `country` with a `window`-day moving
    /// average, after the dataset's warm-up offset.
    ///
    /// Fails with `CountryNotFound` if the country has no rows and
    /// `InvalidArgument` if `window` is 0.
    pub fn daily(&self, metric: Metric, country: &str, window: usize) -> Result<CountryTrend> {
        let points = aggregate::daily_series(
            self.dataset.table(metric),
            country,
            window,
            self.dataset.warmup_offset(),
        )?;
        Ok(CountryTrend {
            country: country.to_string(),
            metric,
            window,
            points,
        })
    }

    /// Daily confirmed cases.
    pub fn confirmed(&self, country: &str, window: usize) -> Result<CountryTrend> {
        self.daily(Metric::Confirmed, country, window)
    }

    /// Daily deaths.
    pub fn deaths(&self, country: &str, window: usize) -> Result<CountryTrend> {
        self.daily(Metric::Deaths, country, window)
    }

    /// Daily recoveries.
    pub fn recovered(&self, country: &str, window: usize) -> Result<CountryTrend> {
        self.daily(Metric::Recovered, country, window)
    }
}
