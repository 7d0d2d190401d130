//! Age-aware download and local file cache for the CSSE CSV tables.
//!
//! Each table is downloaded to the cache directory on first use and
//! re-downloaded once it is older than the configured maximum age. Failed
//! requests are retried with exponential backoff.

use crate::config;
use crate::error::{Result, TrendsError};
use crate::models::Metric;
use reqwest::blocking::Client;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

/// Downloads and caches the CSSE time-series CSV files.
#[derive(Clone)]
pub struct CacheManager {
    /// Directory where cached files are stored.
    pub cache_dir: PathBuf,
    /// If true, never download (use cached files only).
    pub offline: bool,
    /// Base URL the CSV file names are appended to.
    pub base_url: String,
    timeout: Duration,
    max_age: Duration,
    retries: u32,
    client: Option<Client>,
}

impl CacheManager {
    /// Create a new cache manager.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache directory.
    /// Creates the cache directory if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
            base_url: config::CSSE_BASE.to_string(),
            timeout,
            max_age: config::DEFAULT_MAX_AGE,
            retries: config::DEFAULT_RETRIES,
            client: None,
        })
    }

    /// Set how old a cached file may get before it is re-downloaded.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set how many times a failed download is retried.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Download from a mirror instead of the CSSE repository.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            let client = Client::builder()
                .timeout(self.timeout)
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| TrendsError::InvalidArgument("HTTP client unavailable".into()))
    }

    /// Local path a metric's CSV is cached at.
    pub fn csv_path(&self, metric: Metric) -> PathBuf {
        self.cache_dir.join(config::csv_file(metric))
    }

    /// Remote URL a metric's CSV is downloaded from.
    pub fn csv_url(&self, metric: Metric) -> String {
        format!("{}/{}", self.base_url, config::csv_file(metric))
    }

    /// Check whether the cached copy of `metric` is missing or too old.
    pub fn is_stale(&self, metric: Metric) -> bool {
        let path = self.csv_path(metric);
        let modified = fs::metadata(&path).and_then(|m| m.modified());
        match modified {
            Ok(time) => match SystemTime::now().duration_since(time) {
                Ok(age) => age >= self.max_age,
                // Modified in the future (clock skew); treat as fresh.
                Err(_) => false,
            },
            Err(_) => true,
        }
    }

    /// Ensure a metric's CSV is cached locally, downloading if needed.
    ///
    /// # Returns
    ///
    /// Local filesystem path to the cached CSV file.
    pub fn ensure_csv(&mut self, metric: Metric) -> Result<PathBuf> {
        let local_path = self.csv_path(metric);

        if self.is_stale(metric) {
            if self.offline {
                if local_path.exists() {
                    log::warn!("Using stale {} (offline mode)", local_path.display());
                    return Ok(local_path);
                }
                return Err(TrendsError::NotFound(format!(
                    "CSV file {} not cached and offline mode is enabled",
                    config::csv_file(metric)
                )));
            }
            let url = self.csv_url(metric);
            self.download_with_retry(&url, &local_path)?;
        } else {
            log::debug!("Cache hit for {}", local_path.display());
        }

        Ok(local_path)
    }

    /// Re-download every stale table. Returns `true` if anything was fetched.
    pub fn refresh_stale(&mut self) -> Result<bool> {
        if self.offline {
            return Ok(false);
        }
        let mut fetched = false;
        for metric in Metric::ALL {
            if self.is_stale(metric) {
                self.ensure_csv(metric)?;
                fetched = true;
            }
        }
        Ok(fetched)
    }

    /// Download `url` to `dest`, retrying with exponential backoff.
    fn download_with_retry(&mut self, url: &str, dest: &Path) -> Result<()> {
        let mut delay = config::RETRY_BACKOFF;
        let mut attempt = 0;
        loop {
            match self.download_file(url, dest) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    log::warn!(
                        "Download of {} failed ({}); retry {}/{} in {:?}",
                        url,
                        e,
                        attempt,
                        self.retries,
                        delay
                    );
                    thread::sleep(delay);
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Download a single file.
    ///
    /// Writes to a temp file in the cache directory and persists it over
    /// `dest` on success, so an interrupted download never leaves a partial
    /// file behind.
    fn download_file(&mut self, url: &str, dest: &Path) -> Result<()> {
        log::info!("Downloading {}", url);

        let dir = dest.parent().unwrap_or(self.cache_dir.as_path()).to_path_buf();
        fs::create_dir_all(&dir)?;

        let client = self.client()?.clone();
        let resp = client.get(url).send()?.error_for_status()?;
        let bytes = resp.bytes()?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(dest).map_err(|e| TrendsError::Io(e.error))?;

        log::info!("Saved {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }

    /// Drop a cached CSV that failed to parse, so the next load downloads it
    /// again instead of tripping over the same file until it goes stale.
    pub fn evict(&self, metric: Metric) -> Result<()> {
        let path = self.csv_path(metric);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::warn!("Removed corrupt cache file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Close the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}
