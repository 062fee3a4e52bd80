//! The rows we send to the benchmark table.
//!
//! A [`BenchmarkRow`] is deliberately schemaless: the remote table decides what is valid, we only insist on a JSON
//! object.  [`phase1::Phase1Row`] is the typed shape harnesses produce, for callers who would rather not build maps by
//! hand.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod hardware;
pub mod phase1;

#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("row is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("row must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// One benchmark measurement, as an ordered map of column name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkRow(Map<String, Value>);

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl BenchmarkRow {
    pub fn new() -> BenchmarkRow {
        BenchmarkRow::default()
    }

    /// Build a row from anything that serializes to a JSON object.
    pub fn from_record<T: Serialize>(record: &T) -> Result<BenchmarkRow, RowError> {
        BenchmarkRow::try_from(serde_json::to_value(record)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set a column, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Value> for BenchmarkRow {
    type Error = RowError;

    fn try_from(value: Value) -> Result<BenchmarkRow, RowError> {
        match value {
            Value::Object(map) => Ok(BenchmarkRow(map)),
            other => Err(RowError::NotAnObject(kind_of(&other))),
        }
    }
}

impl From<Map<String, Value>> for BenchmarkRow {
    fn from(map: Map<String, Value>) -> BenchmarkRow {
        BenchmarkRow(map)
    }
}

impl FromStr for BenchmarkRow {
    type Err = RowError;

    fn from_str(input: &str) -> Result<BenchmarkRow, RowError> {
        let value: Value = serde_json::from_str(input)?;
        BenchmarkRow::try_from(value)
    }
}

impl fmt::Display for BenchmarkRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
