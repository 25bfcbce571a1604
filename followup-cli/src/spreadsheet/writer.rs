//! Write the reduced single-column spreadsheet consumed by the driver

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use super::FILTERED_SHEET_NAME;

/// Write `values` under a `column` header on a sheet named `Filtrada`.
///
/// Values are written as strings so identifiers never get float-coerced on the way back.
pub fn write_filtered_workbook(path: &Path, column: &str, values: &[String]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(FILTERED_SHEET_NAME)?;

    worksheet.write_string(0, 0, column)?;
    for (idx, value) in values.iter().enumerate() {
        worksheet.write_string((idx + 1) as u32, 0, value)?;
    }

    worksheet.set_column_width(0, 24)?;

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}
