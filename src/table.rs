//! Country-keyed index over one CSSE time-series table.
//!
//! Sub-region rows (provinces, states, overseas territories) are summed into
//! a single cumulative sequence per country once, at load time, so queries
//! never re-filter the raw rows.

use std::collections::btree_map;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{Result, TrendsError};
use crate::models::Metric;

/// Summed cumulative counts for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySeries {
    /// Number of source rows that were summed into this series.
    pub regions: usize,
    /// Cumulative count per date, aligned with [`SeriesTable::dates`].
    pub cumulative: Vec<f64>,
}

impl CountrySeries {
    /// The most recent cumulative count.
    pub fn latest(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }
}

/// Read-only table of cumulative counts, indexed by country.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    metric: Metric,
    dates: Vec<NaiveDate>,
    countries: BTreeMap<String, CountrySeries>,
}

impl SeriesTable {
    /// Start building a table from raw rows.
    pub fn builder(metric: Metric, dates: Vec<NaiveDate>) -> SeriesTableBuilder {
        SeriesTableBuilder {
            metric,
            dates,
            countries: BTreeMap::new(),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Dates of the date columns, in header order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn get(&self, country: &str) -> Option<&CountrySeries> {
        self.countries.get(country)
    }

    pub fn contains(&self, country: &str) -> bool {
        self.countries.contains_key(country)
    }

    /// Country names, deduplicated and in alphabetical order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, CountrySeries> {
        self.countries.iter()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Accumulates rows into a [`SeriesTable`], summing rows that share a country.
pub struct SeriesTableBuilder {
    metric: Metric,
    dates: Vec<NaiveDate>,
    countries: BTreeMap<String, CountrySeries>,
}

impl SeriesTableBuilder {
    /// Add one full row of cumulative counts.
    ///
    /// Fails with [`TrendsError::Parse`] if the row length does not match the
    /// number of dates.
    pub fn row(mut self, country: &str, values: &[f64]) -> Result<Self> {
        if values.len() != self.dates.len() {
            return Err(TrendsError::Parse(format!(
                "row for {} has {} values, expected {}",
                country,
                values.len(),
                self.dates.len()
            )));
        }
        let series = self.entry(country);
        series.regions += 1;
        for (acc, v) in series.cumulative.iter_mut().zip(values) {
            *acc += v;
        }
        Ok(self)
    }

    /// Add a single cell that was already summed over `country`'s rows.
    pub(crate) fn add_cell(&mut self, country: &str, date_idx: usize, value: f64) {
        if date_idx < self.dates.len() {
            self.entry(country).cumulative[date_idx] += value;
        }
    }

    /// Record the number of source rows behind a country.
    pub(crate) fn set_regions(&mut self, country: &str, regions: usize) {
        self.entry(country).regions = regions;
    }

    pub fn build(self) -> SeriesTable {
        SeriesTable {
            metric: self.metric,
            dates: self.dates,
            countries: self.countries,
        }
    }

    fn entry(&mut self, country: &str) -> &mut CountrySeries {
        let n = self.dates.len();
        self.countries
            .entry(country.to_string())
            .or_insert_with(|| CountrySeries {
                regions: 0,
                cumulative: vec![0.0; n],
            })
    }
}
