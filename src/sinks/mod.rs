pub mod csv_file;
pub mod xlsx;

use crate::config::{Config, SaveFormat};
use crate::db::{self, Database};
use crate::errors::PersistResult;
use crate::scraper::Listing;
use std::path::PathBuf;

/// What one save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub destination: String,
    pub batch_size: usize,
    /// Rows that now exist because of this save. For the SQLite store this
    /// excludes urls that were already present.
    pub rows_written: usize,
}

/// Where the run's batch goes. Picked once from the config before crawling.
#[derive(Debug, Clone)]
pub enum Sink {
    Excel(PathBuf),
    Csv(PathBuf),
    Sqlite(Database),
}

impl Sink {
    pub fn from_config(config: &Config) -> Self {
        match config.save_format {
            SaveFormat::Excel => Sink::Excel(config.output_file.clone().unwrap_or_default().into()),
            SaveFormat::Csv => Sink::Csv(config.output_file.clone().unwrap_or_default().into()),
            SaveFormat::Sqlite => Sink::Sqlite(Database::new(&config.db_name)),
        }
    }

    pub fn destination(&self) -> String {
        match self {
            Sink::Excel(path) | Sink::Csv(path) => path.display().to_string(),
            Sink::Sqlite(db) => db.path().display().to_string(),
        }
    }

    /// Write the whole batch. Excel and CSV overwrite the file; SQLite keeps
    /// earlier rows and skips urls it already has.
    pub fn append(&self, listings: &[Listing]) -> PersistResult<SaveReport> {
        if listings.is_empty() {
            tracing::warn!(destination = %self.destination(), "no ads collected, saving an empty batch");
        }

        let rows_written = match self {
            Sink::Excel(path) => xlsx::write_listings(path, listings)?,
            Sink::Csv(path) => csv_file::write_listings(path, listings)?,
            Sink::Sqlite(database) => {
                let summary = db::insert_ads(database, listings)?;
                tracing::info!(
                    inserted = summary.inserted,
                    total = summary.total,
                    "ads stored in database"
                );
                summary.inserted
            }
        };

        let report = SaveReport {
            destination: self.destination(),
            batch_size: listings.len(),
            rows_written,
        };
        tracing::info!(?report, "batch saved");
        Ok(report)
    }
}
