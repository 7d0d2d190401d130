//! DuckDB connection wrapper that turns CSSE CSV files into [`SeriesTable`]s.
//!
//! Uses schema introspection to adapt to the wide CSV layout:
//! - every header that parses as a date is a date column, in header order
//! - date columns are UNPIVOTed and summed per country in SQL
//! - identifying columns other than `Country/Region` are ignored

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use duckdb::Connection as DuckDbConnection;

use crate::error::{Result, TrendsError};
use crate::models::Metric;
use crate::table::SeriesTable;

/// Name of the column rows are grouped by.
pub const COUNTRY_COLUMN: &str = "Country/Region";

/// Wraps an in-memory DuckDB connection used while loading tables.
pub struct Connection {
    conn: DuckDbConnection,
    registered_tables: HashSet<String>,
}

impl Connection {
    /// Open an in-memory DuckDB database.
    pub fn new() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            registered_tables: HashSet::new(),
        })
    }

    /// Load a CSV file into a DuckDB table with every column as VARCHAR.
    ///
    /// Counts are cast per cell later, so a stray blank or non-numeric
    /// cell never fails the whole load.
    pub fn register_csv(&mut self, table_name: &str, csv_path: &Path) -> Result<()> {
        let path_fwd = csv_path.to_string_lossy().replace('\\', "/").replace('\'', "''");
        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} AS \
             SELECT * FROM read_csv('{}', header = true, all_varchar = true)",
            quote_ident(table_name),
            path_fwd
        ))?;
        self.registered_tables.insert(table_name.to_string());
        log::debug!("Registered table: {} -> {}", table_name, path_fwd);
        Ok(())
    }

    /// Column names of a registered table, in order.
    pub fn columns(&self, table_name: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT column_name FROM (DESCRIBE SELECT * FROM {})",
            quote_ident(table_name)
        ))?;

        let mut rows = stmt.query([])?;
        let mut cols = Vec::new();
        while let Some(row) = rows.next()? {
            let col_name: String = row.get(0)?;
            cols.push(col_name);
        }
        Ok(cols)
    }

    /// Register `csv_path` and build the country index for `metric`.
    pub fn load_table(&mut self, metric: Metric, csv_path: &Path) -> Result<SeriesTable> {
        let table_name = metric.table_name();
        self.register_csv(table_name, csv_path)?;

        let columns = self.columns(table_name)?;
        if !columns.iter().any(|c| c == COUNTRY_COLUMN) {
            return Err(TrendsError::Parse(format!(
                "{} has no '{}' column",
                csv_path.display(),
                COUNTRY_COLUMN
            )));
        }

        let date_columns: Vec<(String, NaiveDate)> = columns
            .iter()
            .filter_map(|c| parse_date_header(c).map(|d| (c.clone(), d)))
            .collect();
        if date_columns.is_empty() {
            return Err(TrendsError::Parse(format!(
                "{} has no date columns",
                csv_path.display()
            )));
        }
        if date_columns.windows(2).any(|w| w[0].1 >= w[1].1) {
            return Err(TrendsError::Parse(format!(
                "{} date columns are not in ascending order",
                csv_path.display()
            )));
        }

        let date_index: HashMap<&str, usize> = date_columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.as_str(), i))
            .collect();
        let dates: Vec<NaiveDate> = date_columns.iter().map(|(_, d)| *d).collect();
        let mut builder = SeriesTable::builder(metric, dates);

        let country = quote_ident(COUNTRY_COLUMN);
        let table = quote_ident(table_name);

        // Row counts first, so countries whose cells are all blank still exist.
        {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {country} AS country, COUNT(*) AS regions FROM {table} \
                 WHERE {country} IS NOT NULL GROUP BY country"
            ))?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let name: String = row.get(0)?;
                let regions: i64 = row.get(1)?;
                builder.set_regions(&name, regions.max(0) as usize);
            }
        }

        let cols_sql = date_columns
            .iter()
            .map(|(name, _)| quote_ident(name))
            .collect::<Vec<_>>()
            .join(", ");

        let mut stmt = self.conn.prepare(&format!(
            "SELECT country, label, SUM(TRY_CAST(cumulative AS DOUBLE)) AS total FROM ( \
               UNPIVOT (SELECT {country} AS country, {cols_sql} FROM {table} \
                        WHERE {country} IS NOT NULL) \
               ON {cols_sql} \
               INTO NAME label VALUE cumulative \
             ) GROUP BY country, label"
        ))?;
        let mut rows = stmt.query([])?;
        let mut cells = 0usize;
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let label: String = row.get(1)?;
            let total: Option<f64> = row.get(2)?;
            if let (Some(&idx), Some(total)) = (date_index.get(label.as_str()), total) {
                builder.add_cell(&name, idx, total);
                cells += 1;
            }
        }

        let table = builder.build();
        log::info!(
            "Loaded {} table: {} countries x {} dates ({} cells)",
            metric,
            table.len(),
            table.dates().len(),
            cells
        );
        Ok(table)
    }

    /// Check whether a table has been registered.
    pub fn has_table(&self, name: &str) -> bool {
        self.registered_tables.contains(name)
    }
}

/// Parse a CSSE date header (`1/22/20`); ISO and four-digit-year forms are
/// accepted too.
pub fn parse_date_header(header: &str) -> Option<NaiveDate> {
    let header = header.trim();
    ["%m/%d/%y", "%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(header, fmt).ok())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
