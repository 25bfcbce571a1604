use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use super::{header_index, pick_sheet};
use crate::config::DataDir;
use crate::office::Office;
use crate::spreadsheet::{
    ColumnSelection, RunMetadata, guess_cpf_column, guess_student_id_column, header_columns,
    read_workbook,
};

#[derive(Args)]
pub struct PrepareArgs {
    /// Spreadsheet (.xlsx, .xls or .ods)
    pub file: PathBuf,

    /// Sheet to export (defaults to the first)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Line holding the column titles, starting at 1
    #[arg(long, default_value_t = 1)]
    pub header_row: usize,

    /// AlunoID column; wins over --cpf-column
    #[arg(long)]
    pub alunoid_column: Option<String>,

    /// CPF column, used when there is no AlunoID column
    #[arg(long)]
    pub cpf_column: Option<String>,

    /// Attendant name exactly as listed in the portal
    #[arg(long)]
    pub attendant: String,

    /// Target office: Aldeota, Sul or Bezerra (falls back to HEAD_OFFICE)
    #[arg(long)]
    pub office: Option<String>,

    /// Sponte login e-mail (falls back to SPONTE_EMAIL)
    #[arg(long)]
    pub email: Option<String>,

    /// Sponte password; prompted for when --email is given without it
    #[arg(long)]
    pub password: Option<String>,
}

pub fn handle_prepare_command(args: PrepareArgs, data_dir: &DataDir) -> Result<()> {
    let workbook = read_workbook(&args.file)?;
    let sheet = pick_sheet(&workbook, args.sheet.as_deref())?;
    let header_index = header_index(args.header_row)?;

    let selection = if args.alunoid_column.is_none() && args.cpf_column.is_none() {
        let columns = header_columns(&sheet.rows, header_index);
        let guessed = ColumnSelection {
            student_id_column: guess_student_id_column(&columns),
            cpf_column: guess_cpf_column(&columns),
        };
        println!(
            "No column given, using guesses: AlunoID={} CPF={}",
            guessed.student_id_column.as_deref().unwrap_or("-").cyan(),
            guessed.cpf_column.as_deref().unwrap_or("-").cyan()
        );
        guessed
    } else {
        ColumnSelection {
            student_id_column: args.alunoid_column,
            cpf_column: args.cpf_column,
        }
    };

    let office = args.office.as_deref().map(str::parse::<Office>).transpose()?;

    let password = match (&args.email, args.password) {
        (Some(_), None) => {
            rpassword::prompt_password("Sponte password: ").context("Failed to read password")?
        }
        (_, password) => password.unwrap_or_default(),
    };

    let metadata = RunMetadata {
        attendant: args.attendant,
        sheet: sheet.name.clone(),
        office,
        email: args.email.unwrap_or_default(),
        password,
    };

    let export = selection.export(&sheet.rows, header_index, &metadata)?;
    let persisted = export.persist(data_dir)?;

    println!(
        "{} {} identifier(s) from {} column '{}'",
        "Exported".green().bold(),
        export.rows.len(),
        export.kind,
        export.column
    );
    println!("  {}", persisted.sheet_path.display());
    println!("  {}", persisted.config_path.display());

    Ok(())
}
