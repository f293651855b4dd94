//! Canonical JSON encoding for deterministic content hashing.
//!
//! The audit service digests a deterministic JSON rendering of each record's
//! content fields:
//! - Map keys sorted byte-wise at every nesting depth
//! - Array element order preserved (it is semantically significant)
//! - Strings escaped as JSON string literals
//! - `null` distinct from the empty map `{}` and the empty array `[]`
//!
//! The canonical encoding is critical: two logically-equal field sets must
//! produce identical bytes (and thus identical digests) no matter the order
//! their keys were inserted or stored in.

use std::fmt::Write;

use serde_json::{Number, Value};

/// The closed set of value shapes the canonical encoder understands.
///
/// Keeping the set closed keeps the recursive encoder exhaustive: a new
/// shape forces every match below to handle it.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Element order is preserved.
    Array(Vec<CanonicalValue>),
    /// Entry order is irrelevant; keys are sorted during encoding.
    Map(Vec<(String, CanonicalValue)>),
}

impl From<&Value> for CanonicalValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CanonicalValue::Null,
            Value::Bool(b) => CanonicalValue::Bool(*b),
            Value::Number(n) => CanonicalValue::Number(n.clone()),
            Value::String(s) => CanonicalValue::String(s.clone()),
            Value::Array(items) => {
                CanonicalValue::Array(items.iter().map(CanonicalValue::from).collect())
            }
            Value::Object(entries) => CanonicalValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), CanonicalValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for CanonicalValue {
    fn from(value: Value) -> Self {
        CanonicalValue::from(&value)
    }
}

/// Encode a value to its canonical JSON text.
pub fn canonical_string(value: &CanonicalValue) -> String {
    let mut buf = String::new();
    encode_value_to(&mut buf, value);
    buf
}

/// Encode a value to canonical bytes, suitable for direct digesting.
pub fn canonical_bytes(value: &CanonicalValue) -> Vec<u8> {
    canonical_string(value).into_bytes()
}

/// Recursively encode a value.
fn encode_value_to(buf: &mut String, value: &CanonicalValue) {
    match value {
        CanonicalValue::Null => buf.push_str("null"),
        CanonicalValue::Bool(true) => buf.push_str("true"),
        CanonicalValue::Bool(false) => buf.push_str("false"),
        CanonicalValue::Number(n) => {
            let _ = write!(buf, "{n}");
        }
        CanonicalValue::String(s) => encode_string(buf, s),
        CanonicalValue::Array(items) => encode_array(buf, items),
        CanonicalValue::Map(entries) => encode_map_canonical(buf, entries),
    }
}

/// Encode a string as a JSON string literal.
fn encode_string(buf: &mut String, s: &str) {
    buf.push('"');
    for c in s.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\u{8}' => buf.push_str("\\b"),
            '\u{c}' => buf.push_str("\\f"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                // Remaining control characters use the \u00XX form.
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => buf.push(c),
        }
    }
    buf.push('"');
}

/// Encode an array, preserving element order.
fn encode_array(buf: &mut String, items: &[CanonicalValue]) {
    buf.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        encode_value_to(buf, item);
    }
    buf.push(']');
}

/// Encode a map with keys sorted byte-wise.
///
/// This is the step that erases insertion-order noise: two maps with the
/// same entries encode identically no matter how they were built.
fn encode_map_canonical(buf: &mut String, entries: &[(String, CanonicalValue)]) {
    let mut sorted: Vec<&(String, CanonicalValue)> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    buf.push('{');
    for (i, (key, value)) in sorted.iter().map(|entry| (&entry.0, &entry.1)).enumerate() {
        if i > 0 {
            buf.push(',');
        }
        encode_string(buf, key);
        buf.push(':');
        encode_value_to(buf, value);
    }
    buf.push('}');
}
