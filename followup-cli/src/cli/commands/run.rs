use anyhow::Result;

use crate::automation::run_driver;
use crate::config::{DataDir, Settings};

pub async fn handle_run_command(data_dir: &DataDir, settings: &Settings) -> Result<()> {
    let report = run_driver(data_dir, settings).await?;
    println!("Done: {}", report);
    Ok(())
}
