//! Pure trend and total computations over a [`SeriesTable`].
//!
//! Nothing here touches the network or DuckDB; every function is a
//! deterministic function of its table snapshot.

use crate::error::{Result, TrendsError};
use crate::models::TrendPoint;
use crate::table::SeriesTable;

/// Smoothed new-per-day series for `country`.
///
/// The cumulative series is first-differenced (day 0 has no predecessor and
/// is dropped), averaged over a trailing `window` of days (the first
/// `window - 1` averages are incomplete and dropped), and then the first
/// `offset` smoothed values are skipped. The result has
/// `dates - window - offset` points, or none if that is not positive.
pub fn daily_series(
    table: &SeriesTable,
    country: &str,
    window: usize,
    offset: usize,
) -> Result<Vec<TrendPoint>> {
    if window == 0 {
        return Err(TrendsError::InvalidArgument(
            "window must be at least 1".to_string(),
        ));
    }
    let series = table
        .get(country)
        .ok_or_else(|| TrendsError::CountryNotFound(country.to_string()))?;

    let increments: Vec<f64> = series
        .cumulative
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect();

    // increments[i] belongs to dates[i + 1]; averages[j] to dates[j + window].
    let points = increments
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .zip(table.dates().get(window..).unwrap_or_default())
        .skip(offset)
        .map(|(value, &date)| TrendPoint { date, value })
        .collect();

    Ok(points)
}

/// Most recent cumulative count for `country`, summed over its sub-regions.
///
/// Returns 0 when the country is absent, which callers cannot tell apart
/// from a genuine zero; use [`SeriesTable::contains`] when that matters.
pub fn country_total(table: &SeriesTable, country: &str) -> f64 {
    table.get(country).map(|s| s.latest()).unwrap_or(0.0)
}

/// Most recent cumulative count summed over every row in the table.
pub fn global_total(table: &SeriesTable) -> f64 {
    table.iter().map(|(_, s)| s.latest()).sum()
}

/// Deaths as a percentage of confirmed cases, rounded to 5 decimals.
pub fn mortality_ratio(deaths: f64, confirmed: f64) -> Result<f64> {
    if confirmed == 0.0 {
        return Err(TrendsError::DivisionByZero);
    }
    Ok(round_to(deaths / confirmed * 100.0, 5))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
