pub mod columns;
pub mod prepare;
pub mod run;

pub use columns::{ColumnsArgs, handle_columns_command};
pub use prepare::{PrepareArgs, handle_prepare_command};
pub use run::handle_run_command;

use anyhow::{Result, bail};

use crate::spreadsheet::{Workbook, reader::Sheet};

/// Sheet by name, or the first one
pub(crate) fn pick_sheet<'a>(workbook: &'a Workbook, name: Option<&str>) -> Result<&'a Sheet> {
    match name {
        Some(name) => match workbook.sheet(name) {
            Some(sheet) => Ok(sheet),
            None => bail!(
                "Sheet '{}' not found (available: {})",
                name,
                workbook.sheet_names().join(", ")
            ),
        },
        None => match workbook.sheets.first() {
            Some(sheet) => Ok(sheet),
            None => bail!("Spreadsheet has no sheets"),
        },
    }
}

/// 1-based header row from the command line to a row index
pub(crate) fn header_index(header_row: usize) -> Result<usize> {
    if header_row == 0 {
        bail!("Header rows are numbered from 1");
    }
    Ok(header_row - 1)
}
