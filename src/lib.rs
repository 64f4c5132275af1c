//! tablediff - Key-based structural diff for tabular data
//!
//! Matches rows of two table snapshots by a composite key and reports, per
//! key, whether the row was added, removed, or which cells were modified.

pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;

pub use config::Config;
pub use diff::{compute_diff, diff_tables, CellDiff, DiffEngine, DiffResult, RowChangeType, RowDiff};
pub use error::{DiffError, TableSide};
pub use model::{CellValue, Table};
