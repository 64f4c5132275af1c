//! Composite key derivation and row indexing

use indexmap::map::Entry;
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::diff::canonical::{canonicalize, canonicalize_cell};
use crate::error::{DiffError, Result, TableSide};

use super::table::{CellValue, Row, Table};

/// Separator between key components
pub const KEY_SEPARATOR: &str = "||";

/// Rows of one table keyed by composite key, in table row order
pub type KeyIndex<'a> = IndexMap<String, &'a Row, FxBuildHasher>;

/// Builder for computing composite keys against one table's schema
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    columns: Vec<(String, usize)>,
    side: TableSide,
}

impl KeyBuilder {
    /// Resolve key column names against a table's schema.
    ///
    /// Every name must exist; an unknown name is a schema error, never skipped.
    pub fn new(table: &Table, names: &[String], side: TableSide) -> Result<Self> {
        if names.is_empty() {
            return Err(DiffError::config("at least one key column is required"));
        }

        let columns = names
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .map(|idx| (name.clone(), idx))
                    .ok_or_else(|| DiffError::schema(side, name.as_str()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns, side })
    }

    /// Build the composite key of a row.
    ///
    /// Each component is canonicalized, then `\` and `|` are escaped so the
    /// `||` separator cannot appear inside a component.
    pub fn build_key(&self, row: &Row) -> Result<String> {
        let mut key = String::new();
        for (i, (name, idx)) in self.columns.iter().enumerate() {
            if i > 0 {
                key.push_str(KEY_SEPARATOR);
            }
            let value = row.get(*idx).unwrap_or(&CellValue::Null);
            let part = canonicalize_cell(value, self.side, name, row.source_line)?;
            push_escaped(&mut key, &part);
        }
        Ok(key)
    }
}

fn push_escaped(key: &mut String, part: &str) {
    for ch in part.chars() {
        if ch == '\\' || ch == '|' {
            key.push('\\');
        }
        key.push(ch);
    }
}

/// Index every row of a table by its composite key.
///
/// Two rows producing the same key is an error rather than last-write-wins.
pub fn index_table<'a>(
    table: &'a Table,
    key_columns: &[String],
    side: TableSide,
) -> Result<KeyIndex<'a>> {
    let builder = KeyBuilder::new(table, key_columns, side)?;
    let mut index = KeyIndex::with_capacity_and_hasher(table.row_count(), FxBuildHasher);

    for row in &table.rows {
        let key = builder.build_key(row)?;
        match index.entry(key) {
            Entry::Occupied(existing) => {
                return Err(DiffError::DuplicateKey {
                    side,
                    key: existing.key().clone(),
                    first_row: existing.get().source_line,
                    second_row: row.source_line,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
        }
    }

    log::debug!("indexed {} {} rows by {:?}", index.len(), side, key_columns);
    Ok(index)
}

/// Auto-detect a key column: the first column whose values are unique
pub fn detect_key_columns(table: &Table) -> Vec<String> {
    'columns: for (col_idx, column) in table.columns.iter().enumerate() {
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for row in &table.rows {
            let Some(cell) = row.get(col_idx) else {
                continue 'columns;
            };
            match canonicalize(cell) {
                Ok(value) => {
                    if !seen.insert(value.into_owned()) {
                        continue 'columns;
                    }
                }
                Err(_) => continue 'columns,
            }
        }

        return vec![column.name.clone()];
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn bom_table() -> Table {
        Table::from_rows(
            &["BOM_SID", "SEQ", "AMOUNT"],
            vec![
                vec![CellValue::Int(5000), "01".into(), CellValue::Float(100.0)],
                vec![CellValue::Int(5000), "02".into(), CellValue::Float(300.0)],
            ],
        )
    }

    #[test]
    fn test_composite_key_format() {
        let table = bom_table();
        let index = index_table(&table, &keys(&["BOM_SID", "SEQ"]), TableSide::Old).unwrap();
        let found: Vec<_> = index.keys().cloned().collect();
        assert_eq!(found, vec!["5000||01", "5000||02"]);
    }

    #[test]
    fn test_missing_key_column_is_schema_error() {
        let table = bom_table();
        let err = index_table(&table, &keys(&["BOM_SID", "NOPE"]), TableSide::New).unwrap_err();
        assert_eq!(err, DiffError::schema(TableSide::New, "NOPE"));
    }

    #[test]
    fn test_empty_key_list_is_config_error() {
        let table = bom_table();
        let err = index_table(&table, &[], TableSide::Old).unwrap_err();
        assert!(matches!(err, DiffError::Config { .. }));
    }

    #[test]
    fn test_duplicate_key_reports_both_rows() {
        let table = Table::from_rows(
            &["id", "v"],
            vec![
                vec![CellValue::Int(1), "a".into()],
                vec![CellValue::Int(2), "b".into()],
                vec![CellValue::Int(1), "c".into()],
            ],
        );
        let err = index_table(&table, &keys(&["id"]), TableSide::Old).unwrap_err();
        assert_eq!(
            err,
            DiffError::DuplicateKey {
                side: TableSide::Old,
                key: "1".to_string(),
                first_row: 1,
                second_row: 3,
            }
        );
    }

    #[test]
    fn test_separator_inside_values_does_not_collide() {
        let table = Table::from_rows(
            &["a", "b"],
            vec![
                vec![CellValue::from("x||"), CellValue::from("y")],
                vec![CellValue::from("x"), CellValue::from("||y")],
            ],
        );
        let index = index_table(&table, &keys(&["a", "b"]), TableSide::Old).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_null_and_empty_keys_differ() {
        let table = Table::from_rows(
            &["k"],
            vec![vec![CellValue::Null], vec![CellValue::from("")]],
        );
        let index = index_table(&table, &keys(&["k"]), TableSide::Old).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_error_cell_in_key_fails() {
        let table = Table::from_rows(&["k"], vec![vec![CellValue::Error("#REF!".into())]]);
        let err = index_table(&table, &keys(&["k"]), TableSide::Old).unwrap_err();
        assert!(matches!(err, DiffError::ValueConversion { .. }));
    }

    #[test]
    fn test_detect_key_columns() {
        let table = Table::from_rows(
            &["group", "id"],
            vec![
                vec![CellValue::from("a"), CellValue::Int(1)],
                vec![CellValue::from("a"), CellValue::Int(2)],
            ],
        );
        assert_eq!(detect_key_columns(&table), vec!["id".to_string()]);

        let table = Table::from_rows(&["v"], vec![vec![CellValue::from("x")], vec![CellValue::from("x")]]);
        assert!(detect_key_columns(&table).is_empty());
    }

    #[test]
    fn test_detect_key_skips_columns_with_error_cells() {
        let table = Table::from_rows(
            &["code", "sku"],
            vec![
                vec![CellValue::Error("#N/A".into()), CellValue::from("A-1")],
                vec![CellValue::Int(2), CellValue::from("A-2")],
            ],
        );
        assert_eq!(detect_key_columns(&table), vec!["sku".to_string()]);
    }
}
