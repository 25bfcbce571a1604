//! Data directory shared by the shell and the driver process

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::office::Office;

pub const APP_NAME: &str = "FollowUpAutomation";

/// Environment variable the shell sets for the driver process
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const CONFIG_FILE: &str = "config.json";
pub const FILTERED_SHEET_FILE: &str = "planilha_filtrada.xlsx";
pub const SETTINGS_FILE: &str = "settings.toml";
pub const LOG_FILE: &str = "followup.log";

/// Directory holding the run configuration, filtered sheet, screenshots and reports.
///
/// Resolved once at startup and passed to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve from an explicit override, then `DATA_DIR`, then the platform data dir.
    /// The directory is created when missing.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let root = Self::pick(
            explicit,
            std::env::var_os(DATA_DIR_ENV),
            dirs::data_dir(),
        );

        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory: {}", root.display()))?;

        Ok(Self { root })
    }

    fn pick(
        explicit: Option<PathBuf>,
        env: Option<OsString>,
        platform: Option<PathBuf>,
    ) -> PathBuf {
        if let Some(path) = explicit {
            return path;
        }
        if let Some(value) = env.filter(|v| !v.is_empty()) {
            return PathBuf::from(value);
        }
        platform
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
    }

    /// Use an existing directory as-is
    #[cfg(test)]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn filtered_sheet_path(&self) -> PathBuf {
        self.root.join(FILTERED_SHEET_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }

    pub fn error_report_path(&self, office: Office) -> PathBuf {
        self.root.join(format!("registros_com_erro_{}.xlsx", office))
    }

    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.png", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_override_wins() {
        let picked = DataDir::pick(
            Some(PathBuf::from("/explicit")),
            Some(OsString::from("/from-env")),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(picked, PathBuf::from("/explicit"));
    }

    #[test]
    fn test_env_before_platform() {
        let picked = DataDir::pick(
            None,
            Some(OsString::from("/from-env")),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(picked, PathBuf::from("/from-env"));
    }

    #[test]
    fn test_platform_fallback() {
        let picked = DataDir::pick(None, Some(OsString::new()), Some(PathBuf::from("/platform")));
        assert_eq!(picked, PathBuf::from("/platform").join(APP_NAME));
    }

    #[test]
    fn test_resolve_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested").join("data");
        let data_dir = DataDir::resolve(Some(target.clone())).unwrap();
        assert!(target.is_dir());
        assert_eq!(data_dir.config_path(), target.join("config.json"));
        assert_eq!(data_dir.filtered_sheet_path(), target.join("planilha_filtrada.xlsx"));
    }

    #[test]
    fn test_file_names() {
        let data_dir = DataDir::at("/data");
        assert_eq!(
            data_dir.error_report_path(Office::Sul),
            PathBuf::from("/data/registros_com_erro_Sul.xlsx")
        );
        assert_eq!(
            data_dir.screenshot_path("erro_linha_3"),
            PathBuf::from("/data/erro_linha_3.png")
        );
    }
}
