//! Run configuration handed from the shell to the driver as `config.json`

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::office::Office;
use crate::spreadsheet::IdentifierKind;

/// Flat record persisted next to the filtered spreadsheet.
///
/// Key names are part of the file contract and stay in Portuguese.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(rename = "colunas", default)]
    pub columns: Vec<String>,
    #[serde(rename = "atendente", default)]
    pub attendant: Option<String>,
    #[serde(rename = "coluna_alunoid", default, skip_serializing_if = "Option::is_none")]
    pub student_id_column: Option<String>,
    #[serde(rename = "coluna_cpf", default, skip_serializing_if = "Option::is_none")]
    pub cpf_column: Option<String>,
    #[serde(rename = "aba", default)]
    pub sheet: String,
    #[serde(default)]
    pub head_office: Option<String>,
    #[serde(default)]
    pub sponte_email: Option<String>,
    #[serde(default)]
    pub sponte_password: Option<String>,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("columns", &self.columns)
            .field("attendant", &self.attendant)
            .field("student_id_column", &self.student_id_column)
            .field("cpf_column", &self.cpf_column)
            .field("sheet", &self.sheet)
            .field("head_office", &self.head_office)
            .field("sponte_email", &self.sponte_email)
            .field("sponte_password", &self.sponte_password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Column the driver reads identifiers from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierColumn {
    pub kind: IdentifierKind,
    pub name: String,
}

/// Validated configuration the driver runs with
#[derive(Clone)]
pub struct DriverConfig {
    pub attendant: String,
    pub office: Office,
    pub email: String,
    pub password: String,
    pub column: IdentifierColumn,
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("attendant", &self.attendant)
            .field("office", &self.office)
            .field("email", &self.email)
            .field("password", &"***")
            .field("column", &self.column)
            .finish()
    }
}

impl RunConfig {
    /// Load `config.json`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Configuration file not found: {}", path.display());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }

    /// Write pretty-printed `config.json`
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write configuration: {}", path.display()))
    }

    /// Every identifier column declared by the record, AlunoID first
    pub fn identifier_columns(&self) -> Vec<IdentifierColumn> {
        let declared = [
            (IdentifierKind::StudentId, &self.student_id_column),
            (IdentifierKind::Cpf, &self.cpf_column),
        ];
        declared
            .into_iter()
            .filter_map(|(kind, name)| {
                let name = name.as_ref()?.trim();
                (!name.is_empty()).then(|| IdentifierColumn { kind, name: name.to_string() })
            })
            .collect()
    }

    /// Identifier column declared by the record; AlunoID wins over CPF
    pub fn identifier_column(&self) -> Option<IdentifierColumn> {
        self.identifier_columns().into_iter().next()
    }

    /// Validate and fill gaps from the environment (`HEAD_OFFICE`, `SPONTE_EMAIL`,
    /// `SPONTE_PASSWORD`).
    pub fn into_driver_config(self) -> Result<DriverConfig> {
        self.into_driver_config_with(|key| std::env::var(key).ok())
    }

    pub(crate) fn into_driver_config_with(
        self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<DriverConfig> {
        let pick = |value: Option<String>, key: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
        };

        let Some(column) = self.identifier_column() else {
            bail!("Key 'coluna_alunoid' or 'coluna_cpf' missing from config.json");
        };

        let attendant = self
            .attendant
            .clone()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .context("Key 'atendente' missing from config.json")?;

        let office = pick(self.head_office, "HEAD_OFFICE")
            .context("Office (head_office) not set in config.json nor HEAD_OFFICE")?
            .parse::<Office>()?;

        let email = pick(self.sponte_email, "SPONTE_EMAIL");
        let password = pick(self.sponte_password, "SPONTE_PASSWORD");
        let (Some(email), Some(password)) = (email, password) else {
            bail!("Sponte credentials missing: set e-mail and password in the UI or .env");
        };

        Ok(DriverConfig {
            attendant,
            office,
            email,
            password,
            column,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn complete() -> RunConfig {
        RunConfig {
            columns: vec!["CPF".into()],
            attendant: Some("Leticia Pereira Dos Anjos".into()),
            student_id_column: None,
            cpf_column: Some("CPF".into()),
            sheet: "Planilha1".into(),
            head_office: Some("Sul".into()),
            sponte_email: Some("ops@example.com".into()),
            sponte_password: Some("secret".into()),
        }
    }

    #[test]
    fn test_json_keys() {
        let value = serde_json::to_value(complete()).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["colunas", "atendente", "coluna_cpf", "aba", "head_office", "sponte_email", "sponte_password"] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        assert!(!obj.contains_key("coluna_alunoid"));
    }

    #[test]
    fn test_roundtrip_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        complete().save(&path).unwrap();
        assert_eq!(RunConfig::load(&path).unwrap(), complete());
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = RunConfig::load(&tmp.path().join("config.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_student_id_column_wins() {
        let mut config = complete();
        config.student_id_column = Some("AlunoID".into());
        let column = config.identifier_column().unwrap();
        assert_eq!(column.kind, IdentifierKind::StudentId);
        assert_eq!(column.name, "AlunoID");
    }

    #[test]
    fn test_identifier_columns_lists_both() {
        let mut config = complete();
        config.student_id_column = Some(" AlunoID ".into());
        let columns = config.identifier_columns();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].kind, IdentifierKind::StudentId);
        assert_eq!(columns[0].name, "AlunoID");
        assert_eq!(columns[1].kind, IdentifierKind::Cpf);

        config.student_id_column = Some("".into());
        assert_eq!(config.identifier_columns().len(), 1);
    }

    #[test]
    fn test_driver_config() {
        let driver = complete().into_driver_config_with(no_env).unwrap();
        assert_eq!(driver.office, Office::Sul);
        assert_eq!(driver.column.kind, IdentifierKind::Cpf);
        assert_eq!(driver.column.name, "CPF");
        assert!(!format!("{:?}", driver).contains("secret"));
    }

    #[test]
    fn test_env_fallback() {
        let mut config = complete();
        config.head_office = None;
        config.sponte_email = Some("  ".into());
        config.sponte_password = None;

        let env: HashMap<&str, &str> = [
            ("HEAD_OFFICE", "Aldeota"),
            ("SPONTE_EMAIL", "env@example.com"),
            ("SPONTE_PASSWORD", "env-secret"),
        ]
        .into_iter()
        .collect();

        let driver = config
            .into_driver_config_with(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(driver.office, Office::Aldeota);
        assert_eq!(driver.email, "env@example.com");
        assert_eq!(driver.password, "env-secret");
    }

    #[test]
    fn test_missing_keys_are_fatal() {
        let mut config = complete();
        config.cpf_column = None;
        assert!(config.into_driver_config_with(no_env).is_err());

        let mut config = complete();
        config.attendant = None;
        let err = config.into_driver_config_with(no_env).unwrap_err();
        assert!(err.to_string().contains("atendente"));

        let mut config = complete();
        config.sponte_password = None;
        let err = config.into_driver_config_with(no_env).unwrap_err();
        assert!(err.to_string().contains("credentials"));

        let mut config = complete();
        config.head_office = Some("Centro".into());
        assert!(config.into_driver_config_with(no_env).is_err());
    }
}
