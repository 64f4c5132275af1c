//! Table, Row, and Cell data structures

use chrono::{NaiveDate, NaiveDateTime};

use super::schema::{CellType, Column};

/// A cell value with type information
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Spreadsheet error cell such as `#DIV/0!`; has no comparable form
    Error(String),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            (CellValue::Error(a), CellValue::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl CellValue {
    /// Type of this value, used for column type inference
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Null => CellType::Null,
            CellValue::Bool(_) => CellType::Bool,
            CellValue::Int(_) => CellType::Int,
            CellValue::Float(_) => CellType::Float,
            CellValue::String(_) => CellType::String,
            CellValue::Date(_) => CellType::Date,
            CellValue::DateTime(_) => CellType::DateTime,
            CellValue::Error(_) => CellType::Mixed,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line/row number in source file (1-indexed)
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<CellValue>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A table containing columns and rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column definitions, in schema order
    pub columns: Vec<Column>,
    /// All rows in the table, in source order
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from column names and rows of values.
    ///
    /// Rows are numbered from 1 in the order given. Short rows are padded
    /// with nulls.
    pub fn from_rows<N, R>(names: &[N], rows: R) -> Self
    where
        N: AsRef<str>,
        R: IntoIterator<Item = Vec<CellValue>>,
    {
        let columns = names
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.as_ref(), i))
            .collect();
        let mut table = Table::new(columns);
        for (i, cells) in rows.into_iter().enumerate() {
            table.add_row(cells, i + 1);
        }
        table.infer_column_types();
        table
    }

    /// Add a row to the table, padding missing trailing cells with nulls
    pub fn add_row(&mut self, mut cells: Vec<CellValue>, source_line: usize) {
        if cells.len() < self.columns.len() {
            cells.resize(self.columns.len(), CellValue::Null);
        }
        self.rows.push(Row::new(cells, source_line));
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check whether the schema has a column with this name
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Infer column types from data by widening over every row
    pub fn infer_column_types(&mut self) {
        for col_idx in 0..self.columns.len() {
            let inferred = self
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .fold(CellType::Null, |acc, cell| acc.widen(cell.cell_type()));

            self.columns[col_idx].inferred_type = inferred;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            &["id", "name", "score"],
            vec![
                vec![CellValue::Int(1), "alice".into(), CellValue::Float(1.5)],
                vec![CellValue::Int(2), "bob".into()],
            ],
        )
    }

    #[test]
    fn test_from_rows_pads_and_numbers() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].cells.len(), 3);
        assert_eq!(table.rows[1].cells[2], CellValue::Null);
        assert_eq!(table.rows[0].source_line, 1);
        assert_eq!(table.rows[1].source_line, 2);
    }

    #[test]
    fn test_infer_column_types() {
        let table = sample();
        assert_eq!(table.column("id").map(|c| c.inferred_type), Some(CellType::Int));
        assert_eq!(table.column("name").map(|c| c.inferred_type), Some(CellType::String));
        assert_eq!(table.column("score").map(|c| c.inferred_type), Some(CellType::Float));
    }

    #[test]
    fn test_nan_equality() {
        assert_eq!(CellValue::Float(f64::NAN), CellValue::Float(f64::NAN));
        assert_ne!(CellValue::Int(1), CellValue::Float(1.0));
    }
}
