//! Cell-level comparison logic

use std::borrow::Cow;

use crate::config::Config;
use crate::error::{DiffError, Result, TableSide};
use crate::model::{CellValue, Row, Table};

use super::canonical::{canonicalize_cell, MISSING_SENTINEL};
use super::char_diff::CharDiffAdapter;
use super::CellDiff;

static NULL_CELL: CellValue = CellValue::Null;

/// Compares matched row pairs column by column.
///
/// Columns are taken from the old schema in its order; a column only the new
/// table has is never compared. Holds no mutable state, so one comparator can
/// be shared across threads.
pub struct CellComparator<'a> {
    old_table: &'a Table,
    /// Position of each old column in the new schema
    column_map: Vec<Option<usize>>,
    char_diff: Option<&'a dyn CharDiffAdapter>,
    /// Per old column: whether changed values get a character diff
    char_columns: Vec<bool>,
    ignore_whitespace: bool,
}

impl<'a> CellComparator<'a> {
    /// Create a comparator for rows of `old_table` against rows of `new_table`.
    ///
    /// `char_diff` is consulted only when `config.char_level` is set.
    pub fn new(
        old_table: &'a Table,
        new_table: &'a Table,
        config: &Config,
        char_diff: Option<&'a dyn CharDiffAdapter>,
    ) -> Result<Self> {
        let column_map = old_table
            .columns
            .iter()
            .map(|c| new_table.column_index(&c.name))
            .collect();

        for name in &config.char_diff_columns {
            if !old_table.has_column(name) {
                return Err(DiffError::schema(TableSide::Old, name.as_str()));
            }
        }

        let char_diff = if config.char_level {
            Some(char_diff.ok_or_else(|| {
                DiffError::config("character-level diff requested but no diff adapter available")
            })?)
        } else {
            None
        };

        let char_columns = old_table
            .columns
            .iter()
            .map(|c| config.char_diff_columns.is_empty() || config.char_diff_columns.contains(&c.name))
            .collect();

        Ok(Self {
            old_table,
            column_map,
            char_diff,
            char_columns,
            ignore_whitespace: config.ignore_whitespace,
        })
    }

    /// List the cells that differ between a matched pair of rows
    pub fn compare_rows(&self, old_row: &Row, new_row: &Row) -> Result<Vec<CellDiff>> {
        let mut diffs = Vec::new();

        for (idx, column) in self.old_table.columns.iter().enumerate() {
            let old_cell = old_row.get(idx).unwrap_or(&NULL_CELL);
            let old_value = canonicalize_cell(old_cell, TableSide::Old, &column.name, old_row.source_line)?;

            let new_value = match self.column_map[idx] {
                Some(new_idx) => {
                    let new_cell = new_row.get(new_idx).unwrap_or(&NULL_CELL);
                    canonicalize_cell(new_cell, TableSide::New, &column.name, new_row.source_line)?
                }
                None => Cow::Borrowed(MISSING_SENTINEL),
            };

            if old_value == new_value {
                continue;
            }

            let char_diff = match self.char_diff {
                Some(adapter) if self.char_columns[idx] => {
                    Some(adapter.compute_char_diff(&old_value, &new_value, self.ignore_whitespace))
                }
                _ => None,
            };

            diffs.push(CellDiff {
                column: column.name.clone(),
                old_value: old_value.into_owned(),
                new_value: new_value.into_owned(),
                char_diff,
            });
        }

        Ok(diffs)
    }
}
