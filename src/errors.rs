// errors.rs
use thiserror::Error;

/// Failures of the save step. They never undo the crawl; the caller reports
/// them and exits with a failure status.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
}

pub type PersistResult<T> = Result<T, PersistenceError>;
