//! Async wrapper around [`CovidTrends`] for use in async runtimes (Tokio, etc.).
//!
//! Runs downloads, loads and queries on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use covid_trends::{AsyncCovidTrends, Metric};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sdk = AsyncCovidTrends::builder().build().await.unwrap();
//!
//!     // Run any sync SDK method via closure
//!     let trend = sdk.run(|s| {
//!         s.trends().daily(Metric::Deaths, "Italy", 7)
//!     }).await.unwrap();
//! }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::dataset::Dataset;
use crate::error::{Result, TrendsError};
use crate::models::{CountryTrend, Metric};
use crate::{CovidTrends, CovidTrendsBuilder};

// ---------------------------------------------------------------------------
// AsyncCovidTrendsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCovidTrends`] instance.
///
/// Wraps a [`CovidTrendsBuilder`]; see it for the meaning of each option.
#[derive(Default)]
pub struct AsyncCovidTrendsBuilder {
    inner: CovidTrendsBuilder,
}

impl AsyncCovidTrendsBuilder {
    /// Set a custom cache directory.
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.cache_dir(path);
        self
    }

    /// Enable or disable offline mode.
    pub fn offline(mut self, offline: bool) -> Self {
        self.inner = self.inner.offline(offline);
        self
    }

    /// Set the HTTP request timeout for downloads.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    /// Set how old a cached CSV may be before it is downloaded again.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.inner = self.inner.max_age(max_age);
        self
    }

    /// Set how many times a failed download is retried.
    pub fn retries(mut self, retries: u32) -> Self {
        self.inner = self.inner.retries(retries);
        self
    }

    /// Download the CSV files from a mirror.
    pub fn base_url(mut self, url: &str) -> Self {
        self.inner = self.inner.base_url(url);
        self
    }

    /// Override how many leading smoothed values trend queries skip.
    pub fn warmup_offset(mut self, offset: usize) -> Self {
        self.inner = self.inner.warmup_offset(offset);
        self
    }

    /// Build the async SDK on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncCovidTrends> {
        let inner = self.inner;
        tokio::task::spawn_blocking(move || {
            let sdk = inner.build()?;
            Ok(AsyncCovidTrends::from_sync(sdk))
        })
        .await
        .map_err(|e| TrendsError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCovidTrends
// ---------------------------------------------------------------------------

/// Async wrapper around [`CovidTrends`].
///
/// Queries share a read lock and run in parallel. A refresh downloads and
/// loads without holding it, then takes the write lock only to swap in the
/// new [`Dataset`]. Concurrent refreshes are serialized among themselves.
pub struct AsyncCovidTrends {
    inner: Arc<RwLock<CovidTrends>>,
    refresh_gate: Arc<Mutex<()>>,
}

impl AsyncCovidTrends {
    /// Create a new builder for configuring the async SDK.
    pub fn builder() -> AsyncCovidTrendsBuilder {
        AsyncCovidTrendsBuilder::default()
    }

    /// Wrap an already-built SDK.
    pub fn from_sync(sdk: CovidTrends) -> Self {
        Self {
            inner: Arc::new(RwLock::new(sdk)),
            refresh_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Run a sync SDK operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CovidTrends) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = sdk.read().map_err(|_| poisoned())?;
            f(&guard)
        })
        .await
        .map_err(|e| TrendsError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Smoothed daily series for `country`.
    pub async fn daily(&self, metric: Metric, country: &str, window: usize) -> Result<CountryTrend> {
        let country = country.to_string();
        self.run(move |s| s.trends().daily(metric, &country, window))
            .await
    }

    /// A shared handle to the current snapshot.
    pub async fn dataset(&self) -> Result<Arc<Dataset>> {
        self.run(|s| Ok(s.dataset())).await
    }

    /// Re-download stale CSVs and rebuild the dataset if anything changed.
    pub async fn refresh(&self) -> Result<bool> {
        let sdk = self.inner.clone();
        let gate = self.refresh_gate.clone();
        tokio::task::spawn_blocking(move || {
            let _gate = gate.lock().map_err(|_| poisoned())?;
            let (mut cache, warmup_offset) = {
                let guard = sdk.read().map_err(|_| poisoned())?;
                (guard.cache().clone(), guard.dataset().warmup_offset())
            };
            match crate::reload_stale(&mut cache, warmup_offset)? {
                Some(dataset) => {
                    sdk.write().map_err(|_| poisoned())?.install(dataset);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
        .await
        .map_err(|e| TrendsError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

fn poisoned() -> TrendsError {
    TrendsError::InvalidArgument("SDK lock poisoned".into())
}
