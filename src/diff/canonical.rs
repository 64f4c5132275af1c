//! Canonical string form of cell values
//!
//! Every comparison in the engine works on these strings. The formatting
//! rules are fixed and never consult the process locale, so equal values
//! canonicalize identically on every machine.

use std::borrow::Cow;

use crate::error::{DiffError, Result, TableSide};
use crate::model::CellValue;

/// Canonical form of a null cell
pub const NULL_SENTINEL: &str = "<NULL>";

/// Canonical form of a column the other table's schema does not have
pub const MISSING_SENTINEL: &str = "<MISSING>";

const ESCAPE: char = '\\';

/// A value with no invariant string form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unrepresentable {
    pub reason: String,
}

/// Convert a cell value into its canonical string.
///
/// Strings that would read as a sentinel, or that start with the escape
/// character, get one leading `\` so real data never collides with a sentinel.
pub fn canonicalize(value: &CellValue) -> std::result::Result<Cow<'_, str>, Unrepresentable> {
    let canonical = match value {
        CellValue::Null => Cow::Borrowed(NULL_SENTINEL),
        CellValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        CellValue::Int(i) => Cow::Owned(i.to_string()),
        CellValue::Float(f) => Cow::Owned(format_float(*f)),
        CellValue::String(s) => escape_string(s),
        CellValue::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
        CellValue::DateTime(dt) => Cow::Owned(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        CellValue::Error(e) => {
            return Err(Unrepresentable {
                reason: format!("error cell {}", e),
            })
        }
    };
    Ok(canonical)
}

/// Canonicalize a cell, attaching table/column/row context to failures
pub(crate) fn canonicalize_cell<'a>(
    value: &'a CellValue,
    side: TableSide,
    column: &str,
    row: usize,
) -> Result<Cow<'a, str>> {
    canonicalize(value).map_err(|e| DiffError::ValueConversion {
        side,
        column: column.to_string(),
        row,
        reason: e.reason,
    })
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if f == 0.0 {
        // -0.0 and 0.0 are the same value
        "0".to_string()
    } else {
        // Shortest representation that round-trips; 500.0 prints as "500"
        f.to_string()
    }
}

fn escape_string(s: &str) -> Cow<'_, str> {
    if s == NULL_SENTINEL || s == MISSING_SENTINEL || s.starts_with(ESCAPE) {
        let mut escaped = String::with_capacity(s.len() + 1);
        escaped.push(ESCAPE);
        escaped.push_str(s);
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(s)
    }
}
