use crate::errors::PersistResult;
use crate::scraper::models::COLUMNS;
use crate::scraper::Listing;
use rust_xlsxwriter::Workbook;
use std::borrow::Cow;
use std::path::Path;

/// Longest string Excel accepts in one cell.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Overwrite `path` with one sheet: a header row, then one row per listing.
pub fn write_listings(path: &Path, listings: &[Listing]) -> PersistResult<usize> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // Headers
    for (col, header) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    // Rows
    for (i, listing) in listings.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in listing.to_row().iter().enumerate() {
            let cell = fit_cell(value);
            if let Cow::Owned(_) = cell {
                tracing::warn!(
                    url = %listing.url,
                    column = COLUMNS[col],
                    "value too long for Excel, truncated"
                );
            }
            worksheet.write_string(r, col as u16, &*cell)?;
        }
    }

    workbook.save(path)?;
    tracing::info!(path = %path.display(), rows = listings.len(), "excel file written");
    Ok(listings.len())
}

/// `value` cut to `MAX_CELL_CHARS` characters, borrowed when it already fits.
fn fit_cell(value: &str) -> Cow<'_, str> {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => Cow::Owned(value[..end].to_string()),
        None => Cow::Borrowed(value),
    }
}
