mod api;
mod automation;
mod cli;
mod config;
mod office;
mod portal;
mod resolver;
mod spreadsheet;
mod tui;

use std::fs::OpenOptions;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use config::{DataDir, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let data_dir = DataDir::resolve(cli.data_dir)?;
    let command = cli.command.unwrap_or(Commands::Ui);

    init_logging(&command, &data_dir)?;

    let settings = Settings::load(&data_dir.settings_path())?;

    match command {
        Commands::Ui => tui::run(data_dir).await,
        Commands::Prepare(args) => cli::commands::handle_prepare_command(args, &data_dir),
        Commands::Columns(args) => cli::commands::handle_columns_command(args),
        Commands::Run => cli::commands::handle_run_command(&data_dir, &settings).await,
        Commands::DataDir => {
            println!("{}", data_dir.root().display());
            Ok(())
        }
    }
}

/// The terminal UI owns the screen, so it logs to `followup.log`; everything
/// else logs to stderr, which the UI relays for the driver.
fn init_logging(command: &Commands, data_dir: &DataDir) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if matches!(command, Commands::Ui) {
        let path = data_dir.log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
