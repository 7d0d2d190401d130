//! Trend and total computations over in-memory tables.

mod common;

use covid_trends::aggregate::{country_total, daily_series, global_total, mortality_ratio};
use covid_trends::{Metric, SeriesTable, TrendsError};

fn table(rows: &[(&str, Vec<f64>)]) -> SeriesTable {
    let n = rows.first().map(|(_, v)| v.len()).unwrap_or(0);
    let mut builder = SeriesTable::builder(Metric::Confirmed, common::dates(n));
    for (country, values) in rows {
        builder = builder.row(country, values).unwrap();
    }
    builder.build()
}

fn linear(n: usize, start: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

// ---------------------------------------------------------------------------
// daily_series
// ---------------------------------------------------------------------------

#[test]
fn daily_series_applies_moving_average() {
    let t = table(&[("Spain", vec![0.0, 1.0, 3.0, 6.0, 10.0])]);
    let points = daily_series(&t, "Spain", 2, 0).unwrap();

    // increments 1, 2, 3, 4 -> averages 1.5, 2.5, 3.5
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.5, 2.5, 3.5]);
    let dates = common::dates(5);
    assert_eq!(points[0].date, dates[2]);
    assert_eq!(points[2].date, dates[4]);
}

#[test]
fn daily_series_window_one_is_first_difference_minus_offset() {
    let cumulative = vec![0.0, 2.0, 2.0, 7.0, 8.0, 20.0, 21.0];
    let t = table(&[("Peru", cumulative.clone())]);
    let offset = 2;

    let points = daily_series(&t, "Peru", 1, offset).unwrap();
    let diffs: Vec<f64> = cumulative.windows(2).map(|w| w[1] - w[0]).collect();

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    assert_eq!(values, diffs[offset..].to_vec());
}

#[test]
fn daily_series_length_matches_formula() {
    let n = 60;
    let t = table(&[("Chile", linear(n, 0.0, 3.0))]);
    for window in [1, 3, 5, 7, 14] {
        for offset in [0, 10, 40] {
            let points = daily_series(&t, "Chile", window, offset).unwrap();
            assert_eq!(points.len(), n - 1 - (window - 1) - offset, "window={window} offset={offset}");
        }
    }
}

#[test]
fn daily_series_is_empty_when_warmup_consumes_everything() {
    let t = table(&[("Chile", linear(10, 0.0, 3.0))]);
    assert!(daily_series(&t, "Chile", 3, 40).unwrap().is_empty());
    assert!(daily_series(&t, "Chile", 10, 0).unwrap().is_empty());
    assert!(daily_series(&t, "Chile", 50, 0).unwrap().is_empty());
}

#[test]
fn daily_series_constant_growth_gives_constant_trend() {
    let t = table(&[("Kenya", linear(45, 12.0, 7.0))]);
    let points = daily_series(&t, "Kenya", 3, 0).unwrap();
    assert_eq!(points.len(), 42);
    for p in &points {
        assert!((p.value - 7.0).abs() < 1e-9, "{:?}", p);
    }
}

#[test]
fn daily_series_dates_are_ascending() {
    let t = table(&[("Kenya", linear(30, 0.0, 1.0))]);
    let points = daily_series(&t, "Kenya", 5, 3).unwrap();
    assert!(points.windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn daily_series_unknown_country_is_an_error() {
    let t = table(&[("Kenya", linear(10, 0.0, 1.0))]);
    let err = daily_series(&t, "Narnia", 3, 0).unwrap_err();
    assert!(matches!(err, TrendsError::CountryNotFound(ref c) if c == "Narnia"));
}

#[test]
fn daily_series_rejects_zero_window() {
    let t = table(&[("Kenya", linear(10, 0.0, 1.0))]);
    let err = daily_series(&t, "Kenya", 0, 0).unwrap_err();
    assert!(matches!(err, TrendsError::InvalidArgument(_)));
}

#[test]
fn daily_series_is_deterministic() {
    let t = table(&[("Kenya", vec![0.0, 4.0, 4.0, 9.0, 30.0, 31.0, 50.0])]);
    let a = daily_series(&t, "Kenya", 3, 1).unwrap();
    let b = daily_series(&t, "Kenya", 3, 1).unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// country_total / global_total
// ---------------------------------------------------------------------------

#[test]
fn country_total_sums_last_column_over_regions() {
    let t = table(&[
        ("India", vec![1.0, 2.0, 30.0]),
        ("India", vec![5.0, 6.0, 70.0]),
        ("Nepal", vec![1.0, 1.0, 1.0]),
    ]);
    assert_eq!(country_total(&t, "India"), 100.0);
    assert_eq!(t.get("India").unwrap().regions, 2);
}

#[test]
fn identical_rows_double_the_total() {
    let row = vec![3.0, 8.0, 21.0];
    let single = table(&[("Fiji", row.clone())]);
    let doubled = table(&[("Fiji", row.clone()), ("Fiji", row)]);
    assert_eq!(country_total(&doubled, "Fiji"), 2.0 * country_total(&single, "Fiji"));
}

#[test]
fn country_total_is_zero_for_unknown_country() {
    let t = table(&[("Fiji", vec![3.0, 8.0])]);
    assert_eq!(country_total(&t, "Narnia"), 0.0);
}

#[test]
fn global_total_sums_every_country() {
    let t = table(&[
        ("Fiji", vec![3.0, 8.0]),
        ("Tonga", vec![1.0, 2.0]),
        ("Fiji", vec![0.0, 10.0]),
    ]);
    assert_eq!(global_total(&t), 20.0);
}

#[test]
fn builder_rejects_short_rows() {
    let builder = SeriesTable::builder(Metric::Deaths, common::dates(3));
    let err = builder.row("Fiji", &[1.0, 2.0]).err().unwrap();
    assert!(matches!(err, TrendsError::Parse(_)));
}

#[test]
fn countries_are_sorted_and_unique() {
    let t = table(&[
        ("Zambia", vec![1.0]),
        ("Albania", vec![1.0]),
        ("Zambia", vec![1.0]),
    ]);
    let countries: Vec<&str> = t.countries().collect();
    assert_eq!(countries, vec!["Albania", "Zambia"]);
}

// ---------------------------------------------------------------------------
// mortality_ratio
// ---------------------------------------------------------------------------

#[test]
fn mortality_ratio_of_zero_confirmed_is_division_by_zero() {
    let err = mortality_ratio(0.0, 0.0).unwrap_err();
    assert!(matches!(err, TrendsError::DivisionByZero));
}

#[test]
fn mortality_ratio_is_a_percentage() {
    assert_eq!(mortality_ratio(100.0, 10000.0).unwrap(), 1.0);
    assert_eq!(mortality_ratio(0.0, 50.0).unwrap(), 0.0);
}

#[test]
fn mortality_ratio_rounds_to_five_decimals() {
    assert_eq!(mortality_ratio(1.0, 3.0).unwrap(), 33.33333);
    assert_eq!(mortality_ratio(2.0, 3.0).unwrap(), 66.66667);
}
