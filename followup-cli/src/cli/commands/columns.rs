use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::*;

use super::{header_index, pick_sheet};
use crate::spreadsheet::{guess_cpf_column, guess_student_id_column, header_columns, read_workbook};

#[derive(Args)]
pub struct ColumnsArgs {
    /// Spreadsheet (.xlsx, .xls or .ods)
    pub file: PathBuf,

    /// Sheet to inspect (defaults to the first)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Line holding the column titles, starting at 1
    #[arg(long, default_value_t = 1)]
    pub header_row: usize,
}

pub fn handle_columns_command(args: ColumnsArgs) -> Result<()> {
    let workbook = read_workbook(&args.file)?;

    println!("{}", "Sheets:".bold());
    for name in workbook.sheet_names() {
        println!("  {}", name);
    }

    let sheet = pick_sheet(&workbook, args.sheet.as_deref())?;
    let columns = header_columns(&sheet.rows, header_index(args.header_row)?);

    println!();
    println!(
        "{} {} (row {})",
        "Columns of".bold(),
        sheet.name.cyan(),
        args.header_row
    );
    if columns.is_empty() {
        println!("  {}", "(header row is empty)".dimmed());
    }
    for column in &columns {
        println!("  {}", column);
    }

    let show = |label: &str, guess: Option<String>| match guess {
        Some(col) => println!("{} {}", label, col.green()),
        None => println!("{} {}", label, "none".dimmed()),
    };
    println!();
    show("AlunoID column guess:", guess_student_id_column(&columns));
    show("CPF column guess:    ", guess_cpf_column(&columns));

    Ok(())
}
