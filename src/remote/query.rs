//! Structured queries understood by the document store

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper-bound sentinel appended to a prefix for range "starts with" scans.
///
/// A private-use codepoint that sorts after every character in practical
/// titles.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

/// Comparison operator of a field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
}

/// `field op value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Whether `document` satisfies this filter. Missing fields never match.
    pub fn matches(&self, document: &Value) -> bool {
        let Some(actual) = document.get(&self.field) else {
            return false;
        };

        match self.op {
            FilterOp::Eq => actual == &self.value,
            FilterOp::Gte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// Conjunction of field filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub filters: Vec<FieldFilter>,
}

impl StructuredQuery {
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self {
            filters: vec![FieldFilter::new(field, FilterOp::Eq, value)],
        }
    }

    /// Range scan `[prefix, prefix + PREFIX_SENTINEL]`.
    pub fn starts_with(field: &str, prefix: &str) -> Self {
        let upper = format!("{prefix}{PREFIX_SENTINEL}");
        Self {
            filters: vec![
                FieldFilter::new(field, FilterOp::Gte, prefix),
                FieldFilter::new(field, FilterOp::Lte, upper),
            ],
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.filters.iter().all(|filter| filter.matches(document))
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        // byte order of UTF-8 equals codepoint order
        (Value::String(l), Value::String(r)) => Some(l.as_str().cmp(r.as_str())),
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}
