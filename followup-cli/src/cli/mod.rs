pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ColumnsArgs, PrepareArgs};

#[derive(Parser)]
#[command(name = "followup-cli")]
#[command(version, about = "Billing follow-ups on the Sponte portal, driven from a spreadsheet")]
pub struct Cli {
    /// Data directory (defaults to $DATA_DIR, then the platform data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pick a spreadsheet, export it and watch the driver run (default)
    Ui,
    /// Export a spreadsheet and config.json without starting the driver
    Prepare(PrepareArgs),
    /// List sheets and header columns of a spreadsheet
    Columns(ColumnsArgs),
    /// Run the portal driver against the prepared data directory
    Run,
    /// Print the resolved data directory
    DataDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["followup-cli"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.data_dir.is_none());
    }

    #[test]
    fn test_global_data_dir() {
        let cli = Cli::try_parse_from(["followup-cli", "run", "--data-dir", "/tmp/fu"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Run)));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/fu")));
    }

    #[test]
    fn test_prepare_args() {
        let cli = Cli::try_parse_from([
            "followup-cli",
            "prepare",
            "alunos.xlsx",
            "--cpf-column",
            "CPF",
            "--attendant",
            "Leticia",
            "--office",
            "sul",
            "--header-row",
            "2",
        ])
        .unwrap();

        let Some(Commands::Prepare(args)) = cli.command else {
            panic!("expected prepare");
        };
        assert_eq!(args.file, PathBuf::from("alunos.xlsx"));
        assert_eq!(args.header_row, 2);
        assert_eq!(args.cpf_column.as_deref(), Some("CPF"));
        assert!(args.alunoid_column.is_none());
    }
}
