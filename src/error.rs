#[derive(Debug, thiserror::Error)]
pub enum TrendsError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Country not found: {0}")]
    CountryNotFound(String),

    #[error("Division by zero: confirmed total is 0")]
    DivisionByZero,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TrendsError {
    /// Whether this error came from fetching or parsing a remote table.
    ///
    /// Fetch errors are fatal at startup: the SDK refuses to serve queries
    /// with a missing table.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            TrendsError::DuckDb(_) | TrendsError::Http(_) | TrendsError::Io(_) | TrendsError::Parse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrendsError>;
