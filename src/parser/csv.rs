//! CSV file parser

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{CellValue, Column, Table};

use super::Parser;

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"))
        {
            b'\t'
        } else {
            b','
        };
        read_csv(BufReader::new(file), delimiter)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Read a delimited table with a header row
pub fn read_csv<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.trim(), i))
        .collect();

    let mut table = Table::new(columns);

    for (line_num, result) in csv_reader.records().enumerate() {
        // +2 for 1-indexing and header
        let record = result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?;
        let cells: Vec<CellValue> = record
            .iter()
            .take(table.column_count())
            .map(parse_cell_value)
            .collect();
        table.add_row(cells, line_num + 2);
    }

    table.infer_column_types();
    Ok(table)
}

/// Parse a string value into a CellValue with type inference
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    // Check for empty/null
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "NA" {
        return CellValue::Null;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    // Leading zeros are identifiers ("01"), not numbers
    let zero_padded = trimmed.len() > 1
        && trimmed.starts_with('0')
        && trimmed.as_bytes()[1].is_ascii_digit();

    if !zero_padded {
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() && reads_back_exactly(trimmed, f) {
                return CellValue::Float(f);
            }
        }
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }

    // Try parsing as datetime (ISO 8601)
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, format) {
            return CellValue::DateTime(dt);
        }
    }

    CellValue::String(trimmed.to_string())
}

/// Whether `f` prints back as `text`, ignoring trailing fractional zeros.
///
/// Integers past the i64 range and over-long decimals fail this check and
/// stay strings, so distinct source values never collapse into one float.
fn reads_back_exactly(text: &str, f: f64) -> bool {
    let text = text.strip_prefix('+').unwrap_or(text);
    let text = match text.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => text.to_string(),
    };
    f.to_string() == text
}
