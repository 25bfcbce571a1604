//! Configuration: data directory, per-run record and operator settings

pub mod paths;
pub mod run_config;
pub mod settings;

pub use paths::{DATA_DIR_ENV, DataDir};
pub use run_config::{DriverConfig, IdentifierColumn, RunConfig};
pub use settings::{ApiCredentials, Settings, Waits};
