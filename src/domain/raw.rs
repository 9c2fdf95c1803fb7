//! Loosely-typed records as returned by the board data source.
//!
//! The data source hands out identifiers and positions either as JSON numbers
//! or as numeric strings, and flags as `"1"`/`"0"` strings. These records keep
//! the data source's field names, and fields they do not know are collected in
//! `extra` so a record written back keeps them. Known fields of a record rebuilt
//! from its typed form are written in normalized form (numbers for ids and
//! positions). The typed domain objects are built from these records with the
//! coercion helpers below.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw board record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBoard {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_active: Value,
    #[serde(rename = "ownColumn", default)]
    pub own_column: Vec<RawColumn>,
    #[serde(rename = "ownCategory", default)]
    pub own_category: Vec<RawCategory>,
    #[serde(rename = "sharedUser", default)]
    pub shared_user: Vec<RawUser>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw column record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawColumn {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Value,
    #[serde(default)]
    pub board_id: Value,
    #[serde(rename = "ownTask", default)]
    pub own_task: Vec<RawTask>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw task record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub column_id: Value,
    #[serde(default)]
    pub position: Value,
    #[serde(default, alias = "sharedUser")]
    pub assignees: Vec<RawUser>,
    #[serde(default, alias = "sharedCategory")]
    pub categories: Vec<RawCategory>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw category record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCategory {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_task_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw user record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub default_board_id: Value,
    #[serde(default)]
    pub security_level: Value,
    #[serde(default)]
    pub user_option_id: Value,
    #[serde(default)]
    pub last_login: Value,
    #[serde(default)]
    pub board_access: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Converts a number or numeric string to an integer.
///
/// Integral decimals such as `"5.0"` count as numbers. Returns `None` for
/// anything else: missing values, text, fractional numbers, arrays and objects.
pub fn coerce_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0)
            } else {
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
            }
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| f as i64)
}

/// Converts an identifier-like value to an id. Negative numbers are not ids.
pub fn coerce_id(value: &Value) -> Option<u64> {
    coerce_number(value).and_then(|n| u64::try_from(n).ok())
}

/// Flags are active only when they are exactly the string `"1"`.
pub fn is_flag_set(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == "1")
}
