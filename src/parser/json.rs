//! JSON array parser

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde_json::Value;

use crate::config::Config;
use crate::model::{CellValue, Column, Table};

use super::Parser;

/// Parser for JSON array files
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        read_json(BufReader::new(file))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case("json")
    }
}

/// Read an array of objects (or a single object) into a table.
///
/// Columns appear in order of first appearance across all objects. A missing
/// key and an explicit `null` both read as null; `""` stays an empty string.
pub fn read_json<R: Read>(reader: R) -> Result<Table> {
    let value: Value = serde_json::from_reader(reader).context("Failed to parse JSON file")?;

    let array = match value {
        Value::Array(arr) => arr,
        Value::Object(_) => vec![value],
        _ => bail!("JSON must be an array or object"),
    };

    let mut column_names: IndexSet<String> = IndexSet::new();
    for (i, item) in array.iter().enumerate() {
        match item {
            Value::Object(obj) => {
                for key in obj.keys() {
                    column_names.insert(key.clone());
                }
            }
            _ => bail!("JSON array element {} is not an object", i),
        }
    }

    let columns: Vec<Column> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i))
        .collect();

    let mut table = Table::new(columns);

    for (line_num, item) in array.iter().enumerate() {
        let cells = column_names
            .iter()
            .map(|key| json_value_to_cell(item.get(key)))
            .collect::<Result<Vec<_>>>()?;
        table.add_row(cells, line_num + 1);
    }

    table.infer_column_types();
    Ok(table)
}

fn json_value_to_cell(value: Option<&Value>) -> Result<CellValue> {
    let cell = match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if n.is_f64() {
                n.as_f64().map_or_else(|| CellValue::String(n.to_string()), CellValue::Float)
            } else {
                // u64 past i64::MAX would lose digits as a float
                CellValue::String(n.to_string())
            }
        }
        Some(Value::String(s)) => {
            // Try parsing as date/datetime
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Ok(CellValue::Date(date));
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, format) {
                    return Ok(CellValue::DateTime(dt));
                }
            }
            CellValue::String(s.clone())
        }
        // Nested values compare by their compact JSON text
        Some(nested @ (Value::Array(_) | Value::Object(_))) => {
            CellValue::String(serde_json::to_string(nested).context("Failed to serialize nested value")?)
        }
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_columns_and_nulls() {
        let data = r#"[
            {"id": 1, "note": null, "tags": ["a", "b"]},
            {"id": 2, "note": "", "extra": 1.5}
        ]"#;
        let table = read_json(data.as_bytes()).unwrap();

        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "note", "tags", "extra"]);

        assert_eq!(table.rows[0].cells[1], CellValue::Null);
        assert_eq!(table.rows[1].cells[1], CellValue::from(""));
        assert_eq!(table.rows[0].cells[2], CellValue::from(r#"["a","b"]"#));
        assert_eq!(table.rows[0].cells[3], CellValue::Null);
        assert_eq!(table.rows[1].cells[3], CellValue::Float(1.5));
    }

    #[test]
    fn test_large_unsigned_ids_keep_every_digit() {
        let data = r#"[{"id": 12345678901234567890}, {"id": 12345678901234567891}]"#;
        let table = read_json(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0].cells[0], CellValue::from("12345678901234567890"));
        assert_eq!(table.rows[1].cells[0], CellValue::from("12345678901234567891"));
    }

    #[test]
    fn test_single_object() {
        let table = read_json(r#"{"id": 7}"#.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_rejects_scalars() {
        assert!(read_json("42".as_bytes()).is_err());
        assert!(read_json("[1, 2]".as_bytes()).is_err());
    }

    #[test]
    fn test_empty_array_is_empty_table() {
        let table = read_json("[]".as_bytes()).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }
}
