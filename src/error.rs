//! Error types for diff operations

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiffError>;

/// Which input table an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSide {
    Old,
    New,
}

impl fmt::Display for TableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSide::Old => write!(f, "old"),
            TableSide::New => write!(f, "new"),
        }
    }
}

/// Errors raised by the diff engine.
///
/// All of them are deterministic functions of the inputs and configuration,
/// so none is worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffError {
    #[error("column '{column}' not found in {side} table")]
    Schema { side: TableSide, column: String },

    #[error("duplicate key '{key}' in {side} table (rows {first_row} and {second_row})")]
    DuplicateKey {
        side: TableSide,
        key: String,
        first_row: usize,
        second_row: usize,
    },

    #[error("cannot canonicalize value in column '{column}' ({side} table, row {row}): {reason}")]
    ValueConversion {
        side: TableSide,
        column: String,
        row: usize,
        reason: String,
    },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl DiffError {
    pub fn schema(side: TableSide, column: impl Into<String>) -> Self {
        Self::Schema {
            side,
            column: column.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
