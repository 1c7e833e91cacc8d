use crate::errors::{PersistResult, PersistenceError};
use crate::scraper::models::COLUMNS;
use crate::scraper::Listing;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Excel only detects UTF-8 in a CSV when the file starts with a BOM.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Overwrite `path` with a BOM-prefixed CSV: header row, then one row per listing.
pub fn write_listings(path: &Path, listings: &[Listing]) -> PersistResult<usize> {
    let io_err = |source| PersistenceError::Io {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM).map_err(io_err)?;

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(COLUMNS)?;
    for listing in listings {
        writer.write_record(listing.to_row())?;
    }
    writer.flush().map_err(io_err)?;

    tracing::info!(path = %path.display(), rows = listings.len(), "csv file written");
    Ok(listings.len())
}

/// Read back a file produced by `write_listings`.
#[cfg(test)]
pub fn read_listings(path: &Path) -> PersistResult<Vec<Listing>> {
    let bytes = std::fs::read(path).map_err(|source| PersistenceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

    let mut reader = csv::Reader::from_reader(body);
    let mut listings = Vec::new();
    for record in reader.deserialize() {
        listings.push(record?);
    }
    Ok(listings)
}
