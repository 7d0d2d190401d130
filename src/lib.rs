//! COVID-19 trends SDK for Rust.
//!
//! Downloads the JHU CSSE global time-series tables (confirmed, deaths,
//! recovered), caches them locally, indexes them per country via DuckDB,
//! and derives smoothed daily trends and headline totals.
//!
//! # Quick start
//!
//! ```no_run
//! use covid_trends::{CovidTrends, Metric};
//!
//! let sdk = CovidTrends::builder().build().unwrap();
//!
//! // 7-day moving average of new cases
//! let trend = sdk.trends().daily(Metric::Confirmed, "India", 7).unwrap();
//!
//! // Country vs. worldwide totals
//! let agg = sdk.totals().aggregates("India");
//! ```

pub mod aggregate;
#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod connection;
pub mod dataset;
pub mod error;
pub mod models;
pub mod queries;
pub mod table;

#[cfg(feature = "async")]
pub use async_client::AsyncCovidTrends;
pub use cache::CacheManager;
pub use connection::Connection;
pub use dataset::Dataset;
pub use error::{Result, TrendsError};
pub use models::Metric;
pub use table::{CountrySeries, SeriesTable};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// CovidTrendsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CovidTrends`] instance.
///
/// Use [`CovidTrends::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CovidTrendsBuilder::build) to create the SDK.
#[derive(Debug, Clone)]
pub struct CovidTrendsBuilder {
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    max_age: Duration,
    retries: u32,
    base_url: Option<String>,
    warmup_offset: usize,
}

impl Default for CovidTrendsBuilder {
    fn default() -> Self {
        Self {
            cache_dir: None,
            offline: false,
            timeout: config::DEFAULT_TIMEOUT,
            max_age: config::DEFAULT_MAX_AGE,
            retries: config::DEFAULT_RETRIES,
            base_url: None,
            warmup_offset: config::WARMUP_OFFSET,
        }
    }
}

impl CovidTrendsBuilder {
    /// Set a custom cache directory.
    ///
    /// If not set, the platform-appropriate default cache directory is used
    /// (e.g. `~/.cache/covid-trends` on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode.
    ///
    /// When offline, the SDK never downloads and only uses previously
    /// cached CSV files. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Set the HTTP request timeout for downloads.
    ///
    /// Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how old a cached CSV may be before it is downloaded again.
    ///
    /// Defaults to 24 hours.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set how many times a failed download is retried, with exponential
    /// backoff between attempts. Defaults to 3.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Download the CSV files from a mirror instead of the CSSE repository.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    /// Override how many leading smoothed values trend queries skip.
    ///
    /// Defaults to [`config::WARMUP_OFFSET`].
    pub fn warmup_offset(mut self, offset: usize) -> Self {
        self.warmup_offset = offset;
        self
    }

    /// Build the SDK, downloading (or reusing cached) CSVs and indexing all
    /// three tables.
    ///
    /// Fails fast: if any table cannot be fetched or parsed, no SDK is
    /// returned.
    pub fn build(self) -> Result<CovidTrends> {
        let mut cache = CacheManager::new(self.cache_dir, self.offline, self.timeout)?
            .with_max_age(self.max_age)
            .with_retries(self.retries);
        if let Some(url) = &self.base_url {
            cache = cache.with_base_url(url);
        }
        let dataset = Dataset::load(&mut cache, self.warmup_offset)?;
        Ok(CovidTrends {
            cache,
            dataset: Arc::new(dataset),
        })
    }
}

// ---------------------------------------------------------------------------
// CovidTrends
// ---------------------------------------------------------------------------

/// The main entry point for the SDK.
///
/// Owns the [`CacheManager`] and the current [`Dataset`] snapshot, and
/// exposes query interfaces as lightweight borrowing wrappers.
///
/// Created via [`CovidTrends::builder()`].
pub struct CovidTrends {
    cache: CacheManager,
    dataset: Arc<Dataset>,
}

impl CovidTrends {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> CovidTrendsBuilder {
        CovidTrendsBuilder::default()
    }

    /// Wrap an already-built dataset, e.g. one assembled from fixture tables.
    pub fn from_dataset(cache: CacheManager, dataset: Dataset) -> Self {
        Self {
            cache,
            dataset: Arc::new(dataset),
        }
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the smoothed daily trend query interface.
    pub fn trends(&self) -> queries::TrendQuery<'_> {
        queries::TrendQuery::new(&self.dataset)
    }

    /// Access the country/worldwide totals query interface.
    pub fn totals(&self) -> queries::TotalsQuery<'_> {
        queries::TotalsQuery::new(&self.dataset)
    }

    /// Access the dashboard view-model interface.
    pub fn dashboard(&self) -> queries::DashboardQuery<'_> {
        queries::DashboardQuery::new(&self.dataset)
    }

    // -- Metadata and utility methods --------------------------------------

    /// All countries in the confirmed table, alphabetical and deduplicated.
    pub fn countries(&self) -> Vec<String> {
        self.dataset
            .table(Metric::Confirmed)
            .countries()
            .map(str::to_string)
            .collect()
    }

    /// A shared handle to the current snapshot.
    ///
    /// The snapshot is immutable; it stays valid after [`refresh()`](Self::refresh)
    /// swaps in a newer one.
    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    /// Re-download any CSV older than the configured max age and, if
    /// anything changed, rebuild the dataset.
    ///
    /// Returns `true` if a new snapshot was loaded. On error the current
    /// snapshot is kept.
    pub fn refresh(&mut self) -> Result<bool> {
        match reload_stale(&mut self.cache, self.dataset.warmup_offset())? {
            Some(dataset) => {
                self.install(dataset);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Swap in a newly loaded snapshot.
    pub(crate) fn install(&mut self, dataset: Dataset) {
        self.dataset = Arc::new(dataset);
        log::info!("Dataset refreshed");
    }

    /// Return a reference to the underlying [`CacheManager`].
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Consume the SDK and release all resources.
    pub fn close(mut self) {
        self.cache.close();
    }
}

/// Re-download stale CSVs through `cache` and load a new snapshot from them.
///
/// Returns `None` when every cached file was still fresh.
pub(crate) fn reload_stale(cache: &mut CacheManager, warmup_offset: usize) -> Result<Option<Dataset>> {
    if !cache.refresh_stale()? {
        return Ok(None);
    }
    Dataset::load(cache, warmup_offset).map(Some)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CovidTrends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let confirmed = self.dataset.table(Metric::Confirmed);
        let last = confirmed
            .last_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "none".to_string());
        write!(
            f,
            "CovidTrends(cache_dir={}, countries={}, last_date={}, offline={})",
            self.cache.cache_dir.display(),
            confirmed.len(),
            last,
            self.cache.offline
        )
    }
}
