//! Turn an operator's column choice into the (filtered sheet, run config) pair

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use super::normalize::{IdentifierKind, NormalizedRows, normalize_column};
use super::writer::write_filtered_workbook;
use crate::config::{DataDir, RunConfig};
use crate::office::Office;

/// Columns chosen for each identifier role; `None` means "not selected"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    pub student_id_column: Option<String>,
    pub cpf_column: Option<String>,
}

/// Run metadata entered alongside the column choice
#[derive(Clone, Default)]
pub struct RunMetadata {
    pub attendant: String,
    pub sheet: String,
    pub office: Option<Office>,
    pub email: String,
    pub password: String,
}

/// Result of an export, ready to persist
#[derive(Debug, Clone)]
pub struct Export {
    pub column: String,
    pub kind: IdentifierKind,
    pub rows: NormalizedRows,
    pub config: RunConfig,
}

/// Paths written by [`Export::persist`]
#[derive(Debug, Clone)]
pub struct PersistedExport {
    pub sheet_path: PathBuf,
    pub config_path: PathBuf,
}

impl ColumnSelection {
    /// Pick the authoritative column: AlunoID when chosen and present, else CPF
    pub fn authoritative(&self, header: &[String]) -> Option<(IdentifierKind, String)> {
        let present = |choice: &Option<String>| {
            choice
                .as_ref()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty() && header.iter().any(|h| h == c))
                .map(str::to_string)
        };

        present(&self.student_id_column)
            .map(|c| (IdentifierKind::StudentId, c))
            .or_else(|| present(&self.cpf_column).map(|c| (IdentifierKind::Cpf, c)))
    }

    /// Extract, normalize and dedupe the chosen column from every row after the header
    pub fn export(
        &self,
        rows: &[Vec<String>],
        header_index: usize,
        metadata: &RunMetadata,
    ) -> Result<Export> {
        let header: Vec<String> = rows
            .get(header_index)
            .with_context(|| format!("Header row {} does not exist", header_index + 1))?
            .iter()
            .map(|c| c.trim().to_string())
            .collect();

        let Some((kind, column)) = self.authoritative(&header) else {
            bail!("Choose the AlunoID column or, when there is none, the CPF column");
        };

        let col_idx = header
            .iter()
            .position(|h| *h == column)
            .context("Selected column vanished from the header")?;

        let values = rows
            .iter()
            .skip(header_index + 1)
            .map(|row| row.get(col_idx).map(String::as_str).unwrap_or(""));
        let normalized = normalize_column(kind, values);

        let mut config = RunConfig {
            columns: vec![column.clone()],
            attendant: Some(metadata.attendant.trim().to_string()),
            sheet: metadata.sheet.clone(),
            head_office: metadata.office.map(|o| o.name().to_string()),
            sponte_email: Some(metadata.email.trim().to_string()),
            sponte_password: Some(metadata.password.trim().to_string()),
            ..RunConfig::default()
        };
        match kind {
            IdentifierKind::StudentId => config.student_id_column = Some(column.clone()),
            IdentifierKind::Cpf => config.cpf_column = Some(column.clone()),
        }

        log::info!(
            "Export: {} column '{}' -> {} unique identifier(s)",
            kind,
            column,
            normalized.len()
        );

        Ok(Export {
            column,
            kind,
            rows: normalized,
            config,
        })
    }
}

impl Export {
    /// Write `planilha_filtrada.xlsx` and `config.json` into the data directory
    pub fn persist(&self, data_dir: &DataDir) -> Result<PersistedExport> {
        let sheet_path = data_dir.filtered_sheet_path();
        let config_path = data_dir.config_path();

        write_filtered_workbook(&sheet_path, &self.column, self.rows.values())?;
        self.config.save(&config_path)?;

        Ok(PersistedExport {
            sheet_path,
            config_path,
        })
    }
}
