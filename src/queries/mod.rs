//! Query modules for the covid-trends SDK.
//!
//! Each module provides a query struct that borrows from a
//! [`Dataset`](crate::dataset::Dataset) and exposes request-shaped methods.

pub mod dashboard;
pub mod totals;
pub mod trends;

pub use dashboard::DashboardQuery;
pub use totals::TotalsQuery;
pub use trends::TrendQuery;
