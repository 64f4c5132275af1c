//! Data model for tabular data representation

pub mod key;
mod schema;
mod table;

pub use key::{detect_key_columns, index_table, KeyBuilder, KeyIndex, KEY_SEPARATOR};
pub use schema::{CellType, Column};
pub use table::{CellValue, Row, Table};
