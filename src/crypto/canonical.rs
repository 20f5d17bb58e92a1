//! Canonical JSON encoding
//!
//! Records are hashed over a deterministic JSON rendering: object keys are
//! emitted in name order, items are separated by `", "`, keys by `": "`, and
//! every non-ASCII character is escaped as `\uXXXX`. Two values with the same
//! content always encode to the same bytes, whatever order their fields were
//! inserted in.

use crate::crypto::hash::sha256_hex;
use serde_json::Value;
use std::fmt::Write;

/// Types with a fixed canonical JSON form.
pub trait Canonical {
    /// Builds the JSON value that is fed to the canonical encoder.
    fn canonical_value(&self) -> Value;

    /// Canonical JSON text of this record.
    fn canonical_json(&self) -> String {
        encode(&self.canonical_value())
    }

    /// SHA-256 of the canonical JSON, as lowercase hex.
    fn canonical_hash(&self) -> String {
        sha256_hex(self.canonical_json().as_bytes())
    }
}

/// Encodes a JSON value canonically
pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(number) => {
            let _ = write!(out, "{}", number);
        }
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Map ordering depends on serde_json features, so sort explicitly.
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_string(out, key);
                out.push_str(": ");
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
        }
    }
    out.push('"');
}
