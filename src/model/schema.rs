//! Column descriptors
//!
//! Types here are what a provider observed in the data. They feed the schema
//! report only; matching and cell comparison never look at them.

use serde::{Deserialize, Serialize};

/// Observed type of a column's values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    /// No non-null value seen yet
    #[default]
    Null,
    Bool,
    Int,
    Float,
    String,
    Date,
    DateTime,
    /// Values of incompatible types
    Mixed,
}

impl CellType {
    /// Smallest type covering both `self` and `other`.
    ///
    /// Null is the identity; ints widen to floats and dates to datetimes.
    pub fn widen(self, other: CellType) -> CellType {
        match (self, other) {
            (a, b) if a == b => a,
            (CellType::Null, t) | (t, CellType::Null) => t,
            (CellType::Int, CellType::Float) | (CellType::Float, CellType::Int) => CellType::Float,
            (CellType::Date, CellType::DateTime) | (CellType::DateTime, CellType::Date) => {
                CellType::DateTime
            }
            _ => CellType::Mixed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CellType::Null => "null",
            CellType::Bool => "bool",
            CellType::Int => "int",
            CellType::Float => "float",
            CellType::String => "string",
            CellType::Date => "date",
            CellType::DateTime => "datetime",
            CellType::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named column at a fixed position in one table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header text; the join point between the two tables' schemas
    pub name: String,
    /// 0-based position in the row
    pub index: usize,
    /// Set by `Table::infer_column_types` once rows are loaded
    pub inferred_type: CellType,
}

impl Column {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            inferred_type: CellType::Null,
        }
    }
}
