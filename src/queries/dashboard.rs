//! View models for a dashboard front end: trend charts, summary cards and
//! selector options.
//!
//! This is the request boundary. Unknown countries become empty charts and
//! an undefined mortality ratio becomes `"N/A"`, so a front end can render
//! whatever it gets back.

use crate::config;
use crate::dataset::Dataset;
use crate::error::{Result, TrendsError};
use crate::models::{CountryOption, Metric, MortalityRatio, SummaryCard, TrendChart, WindowPreset};
use crate::queries::{TotalsQuery, TrendQuery};

// ---------------------------------------------------------------------------
// DashboardQuery
// ---------------------------------------------------------------------------

/// Query interface producing ready-to-render dashboard view models.
pub struct DashboardQuery<'a> {
    dataset: &'a Dataset,
}

impl<'a> DashboardQuery<'a> {
    /// Create a new `DashboardQuery` bound to the given dataset.
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Line chart of the smoothed daily series for `country`.
    ///
    /// An unknown country yields a chart with no points. A window outside
    /// `1..=MAX_WINDOW` is rejected with `InvalidArgument`.
    pub fn trend_chart(&self, metric: Metric, country: &str, window: usize) -> Result<TrendChart> {
        if !(1..=config::MAX_WINDOW).contains(&window) {
            return Err(TrendsError::InvalidArgument(format!(
                "window must be between 1 and {}, got {}",
                config::MAX_WINDOW,
                window
            )));
        }

        let points = match TrendQuery::new(self.dataset).daily(metric, country, window) {
            Ok(trend) => trend.points,
            Err(TrendsError::CountryNotFound(name)) => {
                log::warn!("No {} rows for country '{}'; returning empty chart", metric, name);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let (subject, axis) = match metric {
            Metric::Confirmed => ("confirmed cases", "Daily Cases"),
            Metric::Deaths => ("Death cases", "Daily Deaths"),
            Metric::Recovered => ("recovered cases", "Daily Recoveries"),
        };
        let y_title = if window == 1 {
            axis.to_string()
        } else {
            format!("{} ({}-day MA)", axis, window)
        };

        Ok(TrendChart {
            title: format!("Daily {} trend for {}", subject, country),
            x_title: "Date".to_string(),
            y_title,
            metric,
            country: country.to_string(),
            window,
            points,
        })
    }

    /// Confirmed, Dead and Mortality Rate cards for `country`, each with the
    /// worldwide figure alongside.
    pub fn summary_cards(&self, country: &str) -> Vec<SummaryCard> {
        let agg = TotalsQuery::new(self.dataset).aggregates(country);
        vec![
            card("Confirmed", format_count(agg.confirmed), format_count(agg.global_confirmed)),
            card("Dead", format_count(agg.deaths), format_count(agg.global_deaths)),
            card(
                "Mortality Rate",
                format_ratio(agg.mortality),
                format_ratio(agg.global_mortality),
            ),
        ]
    }

    /// Country selector entries, alphabetical and without duplicates.
    pub fn country_options(&self) -> Vec<CountryOption> {
        self.dataset
            .table(Metric::Confirmed)
            .countries()
            .map(|c| CountryOption {
                label: c.to_string(),
                value: c.to_string(),
            })
            .collect()
    }

    /// Moving-average window choices.
    pub fn window_presets(&self) -> Vec<WindowPreset> {
        config::WINDOW_PRESETS
            .iter()
            .map(|&(value, label)| WindowPreset {
                value,
                label: label.to_string(),
            })
            .collect()
    }

    /// The initially selected country: `DEFAULT_COUNTRY` when present,
    /// otherwise the first country alphabetically.
    pub fn default_country(&self) -> Option<String> {
        let table = self.dataset.table(Metric::Confirmed);
        if table.contains(config::DEFAULT_COUNTRY) {
            return Some(config::DEFAULT_COUNTRY.to_string());
        }
        table.countries().next().map(str::to_string)
    }
}

fn card(header: &str, value: String, worldwide: String) -> SummaryCard {
    SummaryCard {
        header: header.to_string(),
        value,
        worldwide: format!("Worldwide: {}", worldwide),
    }
}

/// Whole count with comma thousands separators, e.g. `1,234,567`.
pub fn format_count(value: f64) -> String {
    let n = value.round() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Percentage with 5 decimals, or `N/A` when undefined.
pub fn format_ratio(ratio: MortalityRatio) -> String {
    match ratio {
        MortalityRatio::Percent(p) => format!("{:.5}", p),
        MortalityRatio::Undefined => "N/A".to_string(),
    }
}
