use std::path::PathBuf;
use std::time::Duration;

use crate::models::Metric;

pub const CSSE_BASE: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series";

/// Leading smoothed values skipped because the first weeks of the CSSE
/// series were reported inconsistently.
pub const WARMUP_OFFSET: usize = 40;

pub const DEFAULT_COUNTRY: &str = "India";
pub const DEFAULT_WINDOW: usize = 3;
pub const MAX_WINDOW: usize = 15;

/// Moving-average windows offered to the UI, with their display labels.
pub const WINDOW_PRESETS: [(usize, &str); 5] = [
    (1, "1"),
    (3, "3"),
    (5, "5"),
    (7, "1-Week"),
    (14, "Fortnight"),
];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_RETRIES: u32 = 3;
pub const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// The CSSE tables are republished once a day.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

pub fn csv_file(metric: Metric) -> &'static str {
    match metric {
        Metric::Confirmed => "time_series_covid19_confirmed_global.csv",
        Metric::Deaths => "time_series_covid19_deaths_global.csv",
        Metric::Recovered => "time_series_covid19_recovered_global.csv",
    }
}

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("covid-trends")
    } else {
        PathBuf::from(".covid-trends-cache")
    }
}
