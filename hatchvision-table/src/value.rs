//! Values stored in a shared table

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl TableValue {
    /// Numeric view; booleans read as 1.0 / 0.0
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TableValue::Number(n) => Some(*n),
            TableValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            TableValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TableValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableValue::Boolean(b) => write!(f, "{}", b),
            TableValue::Number(n) => write!(f, "{}", n),
            TableValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for TableValue {
    fn from(value: f64) -> Self {
        TableValue::Number(value)
    }
}

impl From<bool> for TableValue {
    fn from(value: bool) -> Self {
        TableValue::Boolean(value)
    }
}

impl From<&str> for TableValue {
    fn from(value: &str) -> Self {
        TableValue::String(value.to_string())
    }
}

impl From<String> for TableValue {
    fn from(value: String) -> Self {
        TableValue::String(value)
    }
}
