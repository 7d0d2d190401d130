//! The immutable snapshot every query reads from.

use crate::aggregate;
use crate::cache::CacheManager;
use crate::connection::Connection;
use crate::error::{Result, TrendsError};
use crate::models::Metric;
use crate::table::SeriesTable;

/// The three CSSE tables plus the worldwide totals derived from them.
///
/// Built once and never mutated; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Dataset {
    confirmed: SeriesTable,
    deaths: SeriesTable,
    recovered: SeriesTable,
    global_confirmed: f64,
    global_deaths: f64,
    global_recovered: f64,
    warmup_offset: usize,
}

impl Dataset {
    /// Assemble a dataset from already-built tables.
    pub fn new(
        confirmed: SeriesTable,
        deaths: SeriesTable,
        recovered: SeriesTable,
        warmup_offset: usize,
    ) -> Self {
        let global_confirmed = aggregate::global_total(&confirmed);
        let global_deaths = aggregate::global_total(&deaths);
        let global_recovered = aggregate::global_total(&recovered);
        Self {
            confirmed,
            deaths,
            recovered,
            global_confirmed,
            global_deaths,
            global_recovered,
            warmup_offset,
        }
    }

    /// Fetch (or reuse cached) CSVs and index all three tables.
    ///
    /// Fails on the first table that cannot be downloaded or parsed. A cached
    /// file that does not parse is evicted, so the next load fetches it anew.
    pub fn load(cache: &mut CacheManager, warmup_offset: usize) -> Result<Self> {
        let mut conn = Connection::new()?;
        let mut load = |metric: Metric| -> Result<SeriesTable> {
            let path = cache.ensure_csv(metric)?;
            match conn.load_table(metric, &path) {
                Err(e @ (TrendsError::Parse(_) | TrendsError::DuckDb(_))) => {
                    cache.evict(metric)?;
                    Err(e)
                }
                other => other,
            }
        };
        let confirmed = load(Metric::Confirmed)?;
        let deaths = load(Metric::Deaths)?;
        let recovered = load(Metric::Recovered)?;
        Ok(Self::new(confirmed, deaths, recovered, warmup_offset))
    }

    pub fn table(&self, metric: Metric) -> &SeriesTable {
        match metric {
            Metric::Confirmed => &self.confirmed,
            Metric::Deaths => &self.deaths,
            Metric::Recovered => &self.recovered,
        }
    }

    /// Worldwide cumulative count for `metric` as of the last date.
    pub fn global_total(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Confirmed => self.global_confirmed,
            Metric::Deaths => self.global_deaths,
            Metric::Recovered => self.global_recovered,
        }
    }

    /// Number of leading smoothed values trend queries skip.
    pub fn warmup_offset(&self) -> usize {
        self.warmup_offset
    }
}
