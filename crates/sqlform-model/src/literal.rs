//! SQL literal rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quotes a string to be embedded in an SQL statement.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// A constant that can appear in a default clause or check predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constant {
    /// Boolean constant.
    Bool(bool),
    /// Integer constant.
    Int(i64),
    /// Floating point constant.
    Float(f64),
    /// String constant.
    String(String),
}

impl Constant {
    /// Render as SQL text.
    pub fn to_sql(&self) -> String {
        match self {
            Constant::Bool(true) => "TRUE".to_string(),
            Constant::Bool(false) => "FALSE".to_string(),
            Constant::Int(i) => i.to_string(),
            Constant::Float(v) if v.is_nan() => quote("NaN"),
            Constant::Float(v) if v.is_infinite() && v.is_sign_positive() => quote("Infinity"),
            Constant::Float(v) if v.is_infinite() => quote("-Infinity"),
            Constant::Float(v) => format!("{:?}", v),
            Constant::String(s) => quote(s),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::String(value.to_string())
    }
}

impl From<String> for Constant {
    fn from(value: String) -> Self {
        Constant::String(value)
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Int(value)
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Constant::Bool(value)
    }
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Constant::Float(value)
    }
}
