//! Read source and filtered spreadsheets into plain string rows

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook, open_workbook_auto};

use super::FILTERED_SHEET_NAME;

/// A loaded workbook, every cell rendered as its display string
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Read every sheet of an xlsx/xls/ods file
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet: {}", name))?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        sheets.push(Sheet { name, rows });
    }

    log::debug!("Loaded {} sheet(s) from {}", sheets.len(), path.display());
    Ok(Workbook { sheets })
}

/// Read back the single-column sheet written at export time.
///
/// Uses the `Filtrada` sheet when present, otherwise the first sheet.
/// Returns the header label and the data rows' first cell, in file order.
pub fn read_filtered_workbook(path: &Path) -> Result<(String, Vec<String>)> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let names = workbook.sheet_names();
    let sheet_name = names
        .iter()
        .find(|n| n.as_str() == FILTERED_SHEET_NAME)
        .or_else(|| names.first())
        .context("Excel file has no sheets")?
        .clone();
    log::info!("Using sheet: {}", sheet_name);

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .and_then(|row| row.first())
        .map(cell_to_string)
        .context("Spreadsheet has no rows")?;

    let keys = rows
        .map(|row| row.first().map(cell_to_string).unwrap_or_default())
        .collect();

    Ok((header, keys))
}

/// Render a cell as the operator sees it; integral floats lose their `.0`
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("  abc ".into())), "abc");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Float(12345.0)), "12345");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }
}
