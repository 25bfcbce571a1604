//! Optional `settings.toml` in the data directory
//!
//! Everything has a built-in default, so the file only needs the keys an
//! operator wants to change:
//!
//! ```toml
//! [browser]
//! headless = true
//!
//! [waits]
//! post_login_ms = 10000
//!
//! [offices.Sul]
//! token = "..."
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::office::Office;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub portal: PortalSettings,
    pub api: ApiSettings,
    pub browser: BrowserSettings,
    pub automation: AutomationSettings,
    pub waits: Waits,
    /// SOAP credentials per office, keyed by office name
    pub offices: HashMap<String, OfficeCredentials>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    pub base_url: String,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.sponteeducacional.net.br".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.sponteeducacional.net.br/WSAPIEdu.asmx".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// WebDriver server tried first
    pub webdriver_url: String,
    /// Binary started on `webdriver_port` when no server answers
    pub chromedriver_path: String,
    pub webdriver_port: u16,
    pub headless: bool,
    /// Upper bound for element waits (login field, follow-up iframe, selects)
    pub element_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            chromedriver_path: "chromedriver".to_string(),
            webdriver_port: 9515,
            headless: false,
            element_timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// Click the save buttons after filling the form
    pub submit_follow_up: bool,
}

/// Fixed settle durations; the portal exposes no reliable readiness signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Waits {
    pub post_login_ms: u64,
    pub office_switch_ms: u64,
    pub page_load_ms: u64,
    pub tab_click_ms: u64,
    pub frame_enter_ms: u64,
    pub field_ms: u64,
    pub save_ms: u64,
    pub chromedriver_start_ms: u64,
}

impl Default for Waits {
    fn default() -> Self {
        Self {
            post_login_ms: 8000,
            office_switch_ms: 3000,
            page_load_ms: 3000,
            tab_click_ms: 3000,
            frame_enter_ms: 3000,
            field_ms: 400,
            save_ms: 3000,
            chromedriver_start_ms: 1500,
        }
    }
}

impl Waits {
    pub fn post_login(&self) -> Duration {
        Duration::from_millis(self.post_login_ms)
    }

    pub fn office_switch(&self) -> Duration {
        Duration::from_millis(self.office_switch_ms)
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    pub fn tab_click(&self) -> Duration {
        Duration::from_millis(self.tab_click_ms)
    }

    pub fn frame_enter(&self) -> Duration {
        Duration::from_millis(self.frame_enter_ms)
    }

    pub fn field(&self) -> Duration {
        Duration::from_millis(self.field_ms)
    }

    pub fn save(&self) -> Duration {
        Duration::from_millis(self.save_ms)
    }

    pub fn chromedriver_start(&self) -> Duration {
        Duration::from_millis(self.chromedriver_start_ms)
    }
}

/// Credentials for the Sponte SOAP API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeCredentials {
    /// Defaults to the office's built-in client code
    pub client_code: Option<String>,
    pub token: Option<String>,
}

/// Resolved `(client code, token)` pair for one office
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub client_code: String,
    pub token: String,
}

impl Settings {
    /// Load `settings.toml`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// API credentials for an office.
    ///
    /// The token comes from `settings.toml` or the `SPONTE_TOKEN_<OFFICE>`
    /// environment variable; the client code defaults to the office's own.
    pub fn api_credentials(&self, office: Office) -> Option<ApiCredentials> {
        self.api_credentials_with(office, |key| std::env::var(key).ok())
    }

    pub(crate) fn api_credentials_with(
        &self,
        office: Office,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<ApiCredentials> {
        let configured = self
            .offices
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(office.name()))
            .map(|(_, creds)| creds);

        let non_blank = |t: &String| !t.trim().is_empty();
        let token = configured
            .and_then(|c| c.token.clone())
            .filter(non_blank)
            .or_else(|| env(&format!("SPONTE_TOKEN_{}", office.name().to_uppercase())))
            .filter(non_blank)?;

        let client_code = configured
            .and_then(|c| c.client_code.clone())
            .unwrap_or_else(|| office.client_code().to_string());

        Some(ApiCredentials { client_code, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::load(&tmp.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.waits.post_login(), Duration::from_secs(8));
        assert!(!settings.automation.submit_follow_up);
    }

    #[test]
    fn test_partial_file_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[browser]
headless = true

[waits]
post_login_ms = 100

[offices.Sul]
token = "tok-sul"
"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.browser.headless);
        assert_eq!(settings.browser.webdriver_url, "http://localhost:9515");
        assert_eq!(settings.waits.post_login_ms, 100);
        assert_eq!(settings.waits.office_switch_ms, 3000);

        let creds = settings.api_credentials_with(Office::Sul, |_| None).unwrap();
        assert_eq!(creds.client_code, "74070");
        assert_eq!(creds.token, "tok-sul");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "[waits\npost_login_ms = ").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_token_from_env() {
        let settings = Settings::default();
        let creds = settings
            .api_credentials_with(Office::Aldeota, |key| {
                (key == "SPONTE_TOKEN_ALDEOTA").then(|| "tok-env".to_string())
            })
            .unwrap();
        assert_eq!(creds.client_code, "72546");
        assert_eq!(creds.token, "tok-env");

        assert_eq!(settings.api_credentials_with(Office::Bezerra, |_| None), None);
    }

    #[test]
    fn test_blank_file_token_falls_back_to_env() {
        let mut settings = Settings::default();
        settings.offices.insert(
            "Sul".into(),
            OfficeCredentials {
                client_code: Some("99999".into()),
                token: Some("".into()),
            },
        );

        let creds = settings
            .api_credentials_with(Office::Sul, |key| {
                (key == "SPONTE_TOKEN_SUL").then(|| "tok-env".to_string())
            })
            .unwrap();
        assert_eq!(creds.token, "tok-env");
        assert_eq!(creds.client_code, "99999");

        assert_eq!(settings.api_credentials_with(Office::Sul, |_| None), None);
    }
}
