//! The driver process: one browser session working through the filtered sheet

mod best_effort;
pub mod report;
pub mod runner;
pub mod subject;

pub use best_effort::best_effort;
pub use runner::run_driver;
