//! Country and worldwide cumulative totals.

use crate::aggregate;
use crate::dataset::Dataset;
use crate::models::{Aggregates, Metric, MortalityRatio};

// ---------------------------------------------------------------------------
// TotalsQuery
// ---------------------------------------------------------------------------

/// Query interface for headline totals.
pub struct TotalsQuery<'a> {
    dataset: &'a Dataset,
}

impl<'a> TotalsQuery<'a> {
    /// Create a new `TotalsQuery` bound to the given dataset.
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Latest cumulative count for `country`; 0 if the country is unknown.
    pub fn country(&self, metric: Metric, country: &str) -> f64 {
        aggregate::country_total(self.dataset.table(metric), country)
    }

    /// Latest worldwide cumulative count.
    pub fn global(&self, metric: Metric) -> f64 {
        self.dataset.global_total(metric)
    }

    /// Country and worldwide confirmed, deaths and mortality in one record.
    pub fn aggregates(&self, country: &str) -> Aggregates {
        let confirmed = self.country(Metric::Confirmed, country);
        let deaths = self.country(Metric::Deaths, country);
        let global_confirmed = self.global(Metric::Confirmed);
        let global_deaths = self.global(Metric::Deaths);

        Aggregates {
            country: country.to_string(),
            confirmed,
            deaths,
            mortality: ratio(deaths, confirmed),
            global_confirmed,
            global_deaths,
            global_mortality: ratio(global_deaths, global_confirmed),
        }
    }
}

/// `DivisionByZero` is the only way the ratio can fail.
fn ratio(deaths: f64, confirmed: f64) -> MortalityRatio {
    aggregate::mortality_ratio(deaths, confirmed)
        .map_or(MortalityRatio::Undefined, MortalityRatio::Percent)
}
