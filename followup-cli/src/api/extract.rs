//! AlunoID extraction from loosely shaped `GetAlunos` results
//!
//! Each strategy is a pure function from the response value to an optional id.
//! They run in a fixed order and the first hit wins.

use serde_json::Value;

/// Field names that carry a student id, in lookup order
const ID_FIELDS: [&str; 3] = ["AlunoID", "alunoid", "ID"];

/// Keys under which the operation result may sit
const RESULT_KEYS: [&str; 2] = ["GetAlunosResult", "getAlunosResult"];

/// Keys of a DataSet wrapper
const DATASET_KEYS: [&str; 4] = ["diffgram", "Diffgram", "NewDataSet", "dataset"];

pub type Strategy = fn(&Value) -> Option<String>;

/// Strategies in priority order, with names for logging
pub const STRATEGIES: [(&str, Strategy); 3] = [
    ("first_list_element", first_list_element),
    ("nested_table", nested_table),
    ("top_level_id", top_level_id),
];

/// Run every strategy in order and return the first id found
pub fn student_id(response: &Value) -> Option<String> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let id = strategy(response)?;
        log::debug!("AlunoID {} found by strategy {}", id, name);
        Some(id)
    })
}

/// (a) The result is a list: its first element's id
pub fn first_list_element(response: &Value) -> Option<String> {
    let result = unwrap_result(response);

    let first = match result {
        Value::Array(items) => items.first(),
        // A result with one child is a list of records (`<wsAluno>` repeated or single)
        Value::Object(map) if map.len() == 1 => match map.values().next() {
            Some(Value::Array(items)) => items.first(),
            Some(record @ Value::Object(_)) => Some(record),
            _ => None,
        },
        _ => None,
    }?;

    id_field(first)
}

/// (b) Drill into DataSet/diffgram/table wrappers, first element with an id
pub fn nested_table(response: &Value) -> Option<String> {
    let result = unwrap_result(response);
    let dataset = DATASET_KEYS.iter().find_map(|k| result.get(*k));

    let table = dataset
        .and_then(|d| {
            d.get("NewDataSet")
                .and_then(|n| n.get("Table"))
                .or_else(|| d.get("DocumentElement").and_then(|n| n.get("Table")))
                .or_else(|| d.get("Table"))
        })
        .or_else(|| ["Table", "Alunos", "Aluno"].iter().find_map(|k| result.get(*k)))?;

    match table {
        Value::Array(items) => items.iter().find_map(id_field),
        other => id_field(other),
    }
}

/// (c) An id directly on the result
pub fn top_level_id(response: &Value) -> Option<String> {
    id_field(unwrap_result(response))
}

fn unwrap_result(response: &Value) -> &Value {
    RESULT_KEYS
        .iter()
        .find_map(|k| response.get(*k))
        .unwrap_or(response)
}

/// First usable id-like field of a record; `0` is Sponte's "not found"
fn id_field(record: &Value) -> Option<String> {
    ID_FIELDS.iter().find_map(|field| {
        let id = match record.get(*field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!id.is_empty() && id != "0").then_some(id)
    })
}
