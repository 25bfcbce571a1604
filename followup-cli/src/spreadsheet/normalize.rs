//! Identifier normalization, deduplication and header column guesses

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FLOAT_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.0+$").unwrap());

/// Which kind of identifier a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentifierKind {
    /// Sponte-native AlunoID, usable directly in portal URLs
    StudentId,
    /// Brazilian taxpayer id, resolved to an AlunoID through the API
    Cpf,
}

impl IdentifierKind {
    pub fn label(&self) -> &'static str {
        match self {
            IdentifierKind::StudentId => "AlunoID",
            IdentifierKind::Cpf => "CPF",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalize one raw cell value.
///
/// AlunoIDs drop the `.0` suffix left by float coercion, CPFs keep digits only.
pub fn normalize(kind: IdentifierKind, raw: &str) -> String {
    let trimmed = raw.trim();
    match kind {
        IdentifierKind::StudentId => {
            // "1.0.0" has two suffixes; strip until none is left
            let mut value = trimmed.to_string();
            while FLOAT_SUFFIX.is_match(&value) {
                value = FLOAT_SUFFIX.replace(&value, "").into_owned();
            }
            value
        }
        IdentifierKind::Cpf => trimmed.chars().filter(|c| c.is_ascii_digit()).collect(),
    }
}

/// Unique, non-empty normalized identifiers in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRows {
    values: Vec<String>,
}

impl NormalizedRows {
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Normalize every value, drop empties and duplicates
pub fn normalize_column<I, S>(kind: IdentifierKind, values: I) -> NormalizedRows
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let values = values
        .into_iter()
        .map(|v| normalize(kind, v.as_ref()))
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect();

    NormalizedRows { values }
}

/// Non-empty trimmed labels of the header row
pub fn header_columns(rows: &[Vec<String>], header_index: usize) -> Vec<String> {
    rows.get(header_index)
        .map(|row| {
            row.iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Best guess for the AlunoID column
pub fn guess_student_id_column(columns: &[String]) -> Option<String> {
    columns
        .iter()
        .find(|c| {
            let lower = c.to_lowercase();
            lower.contains("alunoid") || lower == "id" || lower == "aluno_id" || lower == "calunoid"
        })
        .cloned()
}

/// Best guess for the CPF column
pub fn guess_cpf_column(columns: &[String]) -> Option<String> {
    columns
        .iter()
        .find(|c| c.to_lowercase() == "cpf")
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_student_id_strips_float_suffix() {
        assert_eq!(normalize(IdentifierKind::StudentId, "12345.0"), "12345");
        assert_eq!(normalize(IdentifierKind::StudentId, " 12345.000 "), "12345");
        assert_eq!(normalize(IdentifierKind::StudentId, "12345"), "12345");
        assert_eq!(normalize(IdentifierKind::StudentId, "12.05"), "12.05");
        assert_eq!(normalize(IdentifierKind::StudentId, "1.0.0"), "1");
    }

    #[test]
    fn test_student_id_normalization_is_idempotent() {
        for raw in ["10.0", "10.00.0", "7", " 3.0 ", "abc.0", "", "1.0.0"] {
            let once = normalize(IdentifierKind::StudentId, raw);
            let twice = normalize(IdentifierKind::StudentId, &once);
            assert_eq!(once, twice, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_cpf_keeps_digits_only() {
        for raw in ["123.456.789-00", " 123 456 789 00", "abc", "12345678900", "CPF: 1-2"] {
            let normalized = normalize(IdentifierKind::Cpf, raw);
            assert!(normalized.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(normalize(IdentifierKind::Cpf, &normalized), normalized);
        }
        assert_eq!(normalize(IdentifierKind::Cpf, "123.456.789-00"), "12345678900");
    }

    #[test]
    fn test_dedup_is_a_set() {
        let input = ["1.0", "2", "1", "3.00", "2.0", "", "  "];
        let rows = normalize_column(IdentifierKind::StudentId, input);
        assert_eq!(rows.values(), &["1", "2", "3"]);

        let unique: HashSet<_> = rows.values().iter().collect();
        assert_eq!(unique.len(), rows.len());
    }

    #[test]
    fn test_header_columns_skips_empty_labels() {
        let rows = vec![
            vec!["titulo".to_string()],
            vec!["Nome".to_string(), "".to_string(), " CPF ".to_string()],
        ];
        assert_eq!(header_columns(&rows, 1), cols(&["Nome", "CPF"]));
        assert!(header_columns(&rows, 5).is_empty());
    }

    #[test]
    fn test_guess_student_id_column() {
        assert_eq!(guess_student_id_column(&cols(&["Nome", "AlunoID"])).as_deref(), Some("AlunoID"));
        assert_eq!(guess_student_id_column(&cols(&["Nome", "cod_alunoid_x"])).as_deref(), Some("cod_alunoid_x"));
        assert_eq!(guess_student_id_column(&cols(&["ID", "Nome"])).as_deref(), Some("ID"));
        assert_eq!(guess_student_id_column(&cols(&["Aluno_ID"])).as_deref(), Some("Aluno_ID"));
        assert_eq!(guess_student_id_column(&cols(&["cAlunoID"])).as_deref(), Some("cAlunoID"));
        assert_eq!(guess_student_id_column(&cols(&["Nome", "identidade"])), None);
    }

    #[test]
    fn test_guess_cpf_column() {
        assert_eq!(guess_cpf_column(&cols(&["Nome", "cpf"])).as_deref(), Some("cpf"));
        assert_eq!(guess_cpf_column(&cols(&["Nome", "CPF"])).as_deref(), Some("CPF"));
        assert_eq!(guess_cpf_column(&cols(&["CPF do aluno"])), None);
    }
}
