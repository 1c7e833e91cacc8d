use crate::errors::PersistResult;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Handle to the SQLite file. A connection is opened per `with_conn` call and
/// closed when the closure returns.
#[derive(Clone, Debug)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Provides a mutable connection to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> PersistResult<T>
    where
        F: FnOnce(&mut Connection) -> PersistResult<T>,
    {
        let mut conn = Connection::open(&self.path)?;
        f(&mut conn)
    }
}
