//! Per-row outcomes of a run and the error workbook written from them

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

const REPORT_SHEET_NAME: &str = "Erros";
const HEADERS: [&str; 5] = ["Linha", "Chave", "AlunoID", "Resultado", "Motivo"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Completed,
    Skipped(String),
    Failed(String),
}

impl RowOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RowOutcome::Completed => "completed",
            RowOutcome::Skipped(_) => "skipped",
            RowOutcome::Failed(_) => "failed",
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            RowOutcome::Completed => "",
            RowOutcome::Skipped(reason) | RowOutcome::Failed(reason) => reason,
        }
    }
}

/// Outcome of one spreadsheet line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    /// Spreadsheet line number, header is line 1
    pub row: usize,
    pub key: String,
    pub student_id: Option<String>,
    pub outcome: RowOutcome,
}

#[derive(Debug, Default, Clone)]
pub struct RunReport {
    pub rows: Vec<RowResult>,
}

impl RunReport {
    pub fn push(&mut self, result: RowResult) {
        self.rows.push(result);
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Completed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&RowOutcome) -> bool) -> usize {
        self.rows.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Rows that were skipped or failed, in file order
    pub fn problems(&self) -> impl Iterator<Item = &RowResult> {
        self.rows
            .iter()
            .filter(|r| !matches!(r.outcome, RowOutcome::Completed))
    }

    /// Write the skipped and failed rows to `path`.
    ///
    /// Returns `false` without touching the filesystem when every row completed.
    pub fn write_error_report(&self, path: &Path) -> Result<bool> {
        if self.problems().next().is_none() {
            return Ok(false);
        }

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(REPORT_SHEET_NAME)?;

        let header_format = Format::new().set_bold();
        for (col, title) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }

        for (idx, result) in self.problems().enumerate() {
            let row = (idx + 1) as u32;
            sheet.write_number(row, 0, result.row as f64)?;
            sheet.write_string(row, 1, &result.key)?;
            sheet.write_string(row, 2, result.student_id.as_deref().unwrap_or(""))?;
            sheet.write_string(row, 3, result.outcome.label())?;
            sheet.write_string(row, 4, result.outcome.reason())?;
        }

        sheet.autofit();

        workbook
            .save(path)
            .with_context(|| format!("Failed to save run report: {}", path.display()))?;

        Ok(true)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} completed, {} skipped, {} failed",
            self.completed(),
            self.skipped(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::read_workbook;

    fn result(row: usize, key: &str, id: Option<&str>, outcome: RowOutcome) -> RowResult {
        RowResult {
            row,
            key: key.to_string(),
            student_id: id.map(str::to_string),
            outcome,
        }
    }

    fn sample() -> RunReport {
        let mut report = RunReport::default();
        report.push(result(2, "111", Some("10"), RowOutcome::Completed));
        report.push(result(3, "222", None, RowOutcome::Skipped("identifier not resolved".into())));
        report.push(result(4, "333", Some("30"), RowOutcome::Failed("Follow-up tab not found".into())));
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.completed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.to_string(), "1 completed, 1 skipped, 1 failed");
    }

    #[test]
    fn test_clean_run_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("registros_com_erro_Sul.xlsx");

        let mut report = RunReport::default();
        report.push(result(2, "111", Some("10"), RowOutcome::Completed));

        assert!(!report.write_error_report(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_report_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("registros_com_erro_Sul.xlsx");

        assert!(sample().write_error_report(&path).unwrap());

        let workbook = read_workbook(&path).unwrap();
        let sheet = workbook.sheet(REPORT_SHEET_NAME).unwrap();
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0], HEADERS.map(String::from).to_vec());
        assert_eq!(sheet.rows[1], vec!["3", "222", "", "skipped", "identifier not resolved"]);
        assert_eq!(sheet.rows[2], vec!["4", "333", "30", "failed", "Follow-up tab not found"]);
    }
}
