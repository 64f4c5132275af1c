//! Excel file parser (xlsx, xls, ods)

use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::Timelike;

use crate::config::Config;
use crate::model::{CellValue, Column, Table};

use super::Parser;

/// Parser for Excel files
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let sheet_name = match config.sheet_name {
            Some(ref name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .context("No sheets found in workbook")?,
        };

        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        parse_range(&range)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm")
    }
}

fn parse_range(range: &Range<Data>) -> Result<Table> {
    let mut rows = range.rows();

    // First row is header
    let Some(header_row) = rows.next() else {
        bail!("Empty sheet");
    };
    let columns: Vec<Column> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = header_name(cell);
            Column::new(if name.is_empty() { format!("Column{}", i + 1) } else { name }, i)
        })
        .collect();

    let mut table = Table::new(columns);

    for (line_num, row) in rows.enumerate() {
        let cells: Vec<CellValue> = row.iter().map(convert_cell).collect();
        table.add_row(cells, line_num + 2); // +2 for 1-indexing and header
    }

    table.infer_column_types();
    Ok(table)
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Float(f) => {
            // Whole numbers are stored as floats
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                CellValue::Int(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.num_seconds_from_midnight() == 0 && datetime.nanosecond() == 0 => {
                CellValue::Date(datetime.date())
            }
            Some(datetime) => CellValue::DateTime(datetime),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => {
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                CellValue::DateTime(dt)
            } else if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                CellValue::Date(d)
            } else {
                CellValue::String(s.clone())
            }
        }
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Null);
        assert_eq!(convert_cell(&Data::String(String::new())), CellValue::from(""));
        assert_eq!(convert_cell(&Data::Float(3.0)), CellValue::Int(3));
        assert_eq!(convert_cell(&Data::Float(2.5)), CellValue::Float(2.5));
        assert!(matches!(
            convert_cell(&Data::Error(CellErrorType::Div0)),
            CellValue::Error(_)
        ));
    }

    #[test]
    fn test_parse_range() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("id".into()));
        range.set_value((0, 1), Data::Empty);
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((1, 1), Data::String("a".into()));
        range.set_value((2, 0), Data::Float(2.0));

        let table = parse_range(&range).unwrap();
        assert_eq!(table.columns[1].name, "Column2");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].source_line, 3);
        assert_eq!(table.rows[1].cells[1], CellValue::Null);
    }
}
