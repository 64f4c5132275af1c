//! Schema comparison logic
//!
//! Informational only: row matching never depends on these results.

use serde::{Deserialize, Serialize};

use crate::model::{CellType, Table};

/// Types of schema changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaChange {
    /// Column was added
    ColumnAdded { name: String, index: usize },
    /// Column was removed
    ColumnRemoved { name: String, index: usize },
    /// Column was moved to different position
    ColumnMoved {
        name: String,
        from_index: usize,
        to_index: usize,
    },
    /// Column type changed
    ColumnTypeChanged {
        name: String,
        old_type: CellType,
        new_type: CellType,
    },
}

impl std::fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaChange::ColumnAdded { name, index } => {
                write!(f, "+ {} (new column at position {})", name, index)
            }
            SchemaChange::ColumnRemoved { name, index } => {
                write!(f, "- {} (removed from position {})", name, index)
            }
            SchemaChange::ColumnMoved {
                name,
                from_index,
                to_index,
            } => {
                write!(f, "↔ {} (moved from {} to {})", name, from_index, to_index)
            }
            SchemaChange::ColumnTypeChanged {
                name,
                old_type,
                new_type,
            } => {
                write!(f, "⚡ {} (type {} → {})", name, old_type, new_type)
            }
        }
    }
}

/// Schema comparison engine
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare schemas of two tables
    pub fn compare(old_table: &Table, new_table: &Table) -> Vec<SchemaChange> {
        let mut changes = Vec::new();

        // Removed
        for (old_idx, old_col) in old_table.columns.iter().enumerate() {
            if !new_table.has_column(&old_col.name) {
                changes.push(SchemaChange::ColumnRemoved {
                    name: old_col.name.clone(),
                    index: old_idx,
                });
            }
        }

        // Added
        for (new_idx, new_col) in new_table.columns.iter().enumerate() {
            if !old_table.has_column(&new_col.name) {
                changes.push(SchemaChange::ColumnAdded {
                    name: new_col.name.clone(),
                    index: new_idx,
                });
            }
        }

        // Moved and retyped
        for (old_idx, old_col) in old_table.columns.iter().enumerate() {
            let Some(new_idx) = new_table.column_index(&old_col.name) else {
                continue;
            };
            if old_idx != new_idx {
                changes.push(SchemaChange::ColumnMoved {
                    name: old_col.name.clone(),
                    from_index: old_idx,
                    to_index: new_idx,
                });
            }

            // An all-null column carries no type information
            let new_type = new_table.columns[new_idx].inferred_type;
            let old_type = old_col.inferred_type;
            if old_type != new_type && old_type != CellType::Null && new_type != CellType::Null {
                changes.push(SchemaChange::ColumnTypeChanged {
                    name: old_col.name.clone(),
                    old_type,
                    new_type,
                });
            }
        }

        changes
    }
}
