//! Diff engine for comparing tables

pub mod canonical;
pub mod cell_diff;
pub mod char_diff;
mod row_diff;
mod schema_diff;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::model::Table;

pub use cell_diff::CellComparator;
pub use char_diff::{CharDiffAdapter, DiffModel, DiffSpan, SpanTag};
pub use row_diff::RowMatcher;
pub use schema_diff::{SchemaChange, SchemaDiff};

#[cfg(feature = "char-diff")]
pub use char_diff::SimilarCharDiff;

/// How a row changed between the old and new table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowChangeType {
    Added,
    Removed,
    Modified,
}

impl RowChangeType {
    /// The change as seen when diffing in the opposite direction
    pub fn inverse(self) -> Self {
        match self {
            RowChangeType::Added => RowChangeType::Removed,
            RowChangeType::Removed => RowChangeType::Added,
            RowChangeType::Modified => RowChangeType::Modified,
        }
    }
}

impl std::fmt::Display for RowChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowChangeType::Added => write!(f, "added"),
            RowChangeType::Removed => write!(f, "removed"),
            RowChangeType::Modified => write!(f, "modified"),
        }
    }
}

/// A change to a single cell, in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDiff {
    /// Column name
    pub column: String,
    /// Canonical old value
    pub old_value: String,
    /// Canonical new value
    pub new_value: String,
    /// Character-level detail, when requested
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub char_diff: Option<DiffModel>,
}

/// A change to a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDiff {
    #[serde(rename = "type")]
    pub change_type: RowChangeType,
    /// Composite key of the row
    pub key: String,
    /// Changed cells; only present for modified rows, and then never empty
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cells: Option<Vec<CellDiff>>,
}

impl RowDiff {
    pub fn added(key: String) -> Self {
        Self {
            change_type: RowChangeType::Added,
            key,
            cells: None,
        }
    }

    pub fn removed(key: String) -> Self {
        Self {
            change_type: RowChangeType::Removed,
            key,
            cells: None,
        }
    }

    /// A modified row, or `None` when no cell differs
    pub fn modified(key: String, cells: Vec<CellDiff>) -> Option<Self> {
        if cells.is_empty() {
            return None;
        }
        Some(Self {
            change_type: RowChangeType::Modified,
            key,
            cells: Some(cells),
        })
    }

    /// Changed cells (empty for added/removed rows)
    pub fn cell_diffs(&self) -> &[CellDiff] {
        self.cells.as_deref().unwrap_or_default()
    }
}

/// Statistics about the diff
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub rows_added: usize,
    pub rows_removed: usize,
    pub rows_modified: usize,
    pub rows_unchanged: usize,
    pub cells_changed: usize,
    pub old_row_count: usize,
    pub new_row_count: usize,
}

impl DiffStats {
    fn tally(row_diffs: &[RowDiff], old_row_count: usize, new_row_count: usize) -> Self {
        let mut stats = DiffStats {
            old_row_count,
            new_row_count,
            ..Default::default()
        };
        for diff in row_diffs {
            match diff.change_type {
                RowChangeType::Added => stats.rows_added += 1,
                RowChangeType::Removed => stats.rows_removed += 1,
                RowChangeType::Modified => {
                    stats.rows_modified += 1;
                    stats.cells_changed += diff.cell_diffs().len();
                }
            }
        }
        stats.rows_unchanged = old_row_count - stats.rows_removed - stats.rows_modified;
        stats
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.rows_added > 0 || self.rows_removed > 0 || self.rows_modified > 0
    }
}

/// Result of comparing two tables
#[derive(Debug, Default, Clone, Serialize)]
pub struct DiffResult {
    /// Schema changes between tables
    pub schema_changes: Vec<SchemaChange>,
    /// Row changes: removed/modified in old order, then added in new order
    pub row_diffs: Vec<RowDiff>,
    /// Statistics
    pub stats: DiffStats,
}

impl DiffResult {
    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        !self.schema_changes.is_empty() || self.stats.has_changes()
    }

    /// Row changes of one kind, in result order
    pub fn of_type(&self, change_type: RowChangeType) -> impl Iterator<Item = &RowDiff> {
        self.row_diffs
            .iter()
            .filter(move |d| d.change_type == change_type)
    }
}

/// Main diff engine
pub struct DiffEngine {
    config: Config,
    char_diff: Option<Box<dyn CharDiffAdapter>>,
}

impl DiffEngine {
    /// Create a diff engine using the default character diff, if compiled in
    pub fn new(config: Config) -> Self {
        Self {
            config,
            char_diff: default_char_diff(),
        }
    }

    /// Replace the character diff implementation
    pub fn with_char_diff(mut self, adapter: Box<dyn CharDiffAdapter>) -> Self {
        self.char_diff = Some(adapter);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compare two tables
    pub fn diff(&self, old_table: &Table, new_table: &Table) -> Result<DiffResult> {
        let started = Instant::now();

        let matcher = RowMatcher::new(&self.config, self.char_diff.as_deref());
        let row_diffs = matcher.diff(old_table, new_table)?;
        log::debug!("matched rows in {:?}", started.elapsed());

        let stats = DiffStats::tally(&row_diffs, old_table.row_count(), new_table.row_count());
        log::info!(
            "{} added, {} removed, {} modified, {} unchanged",
            stats.rows_added,
            stats.rows_removed,
            stats.rows_modified,
            stats.rows_unchanged
        );

        Ok(DiffResult {
            schema_changes: SchemaDiff::compare(old_table, new_table),
            row_diffs,
            stats,
        })
    }
}

#[cfg(feature = "char-diff")]
fn default_char_diff() -> Option<Box<dyn CharDiffAdapter>> {
    Some(Box::new(SimilarCharDiff))
}

#[cfg(not(feature = "char-diff"))]
fn default_char_diff() -> Option<Box<dyn CharDiffAdapter>> {
    None
}

/// Convenience function to compute diff
pub fn compute_diff(old_table: &Table, new_table: &Table, config: &Config) -> Result<DiffResult> {
    let engine = DiffEngine::new(config.clone());
    engine.diff(old_table, new_table)
}

/// Diff two tables by key columns, returning only the ordered row changes
pub fn diff_tables(
    old_table: &Table,
    new_table: &Table,
    key_columns: &[&str],
    char_level: bool,
    ignore_whitespace: bool,
) -> Result<Vec<RowDiff>> {
    let config = Config::default()
        .with_key_columns(key_columns.iter().map(|k| k.to_string()).collect())
        .with_char_level(char_level)
        .with_ignore_whitespace(ignore_whitespace);
    compute_diff(old_table, new_table, &config).map(|result| result.row_diffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;
    use pretty_assertions::assert_eq;

    fn row(sid: i64, seq: &str, amount: f64, count: i64) -> Vec<CellValue> {
        vec![
            CellValue::Int(sid),
            seq.into(),
            CellValue::Float(amount),
            CellValue::Int(count),
        ]
    }

    const COLUMNS: [&str; 4] = ["BOM_SID", "SEQ", "AMOUNT", "COUNT"];

    fn old_bom() -> Table {
        Table::from_rows(
            &COLUMNS,
            vec![
                row(5000, "01", 100.0, 50),
                row(5000, "02", 300.0, 70),
                row(5000, "03", 500.0, 10),
            ],
        )
    }

    fn new_bom() -> Table {
        Table::from_rows(
            &COLUMNS,
            vec![
                row(5000, "01", 100.0, 50),
                row(5000, "03", 700.0, 10),
                row(5000, "04", 500.0, 10),
            ],
        )
    }

    #[test]
    fn test_bom_scenario() {
        let diffs = diff_tables(&old_bom(), &new_bom(), &["BOM_SID", "SEQ"], false, true).unwrap();
        assert_eq!(
            diffs,
            vec![
                RowDiff::removed("5000||02".into()),
                RowDiff {
                    change_type: RowChangeType::Modified,
                    key: "5000||03".into(),
                    cells: Some(vec![CellDiff {
                        column: "AMOUNT".into(),
                        old_value: "500".into(),
                        new_value: "700".into(),
                        char_diff: None,
                    }]),
                },
                RowDiff::added("5000||04".into()),
            ]
        );
    }

    #[test]
    fn test_stats() {
        let config = Config::default().with_key_columns(vec!["BOM_SID".into(), "SEQ".into()]);
        let result = compute_diff(&old_bom(), &new_bom(), &config).unwrap();
        assert_eq!(
            result.stats,
            DiffStats {
                rows_added: 1,
                rows_removed: 1,
                rows_modified: 1,
                rows_unchanged: 1,
                cells_changed: 1,
                old_row_count: 3,
                new_row_count: 3,
            }
        );
        assert!(result.has_changes());
        assert!(result.schema_changes.is_empty());
        assert_eq!(result.of_type(RowChangeType::Added).count(), 1);
    }

    #[test]
    fn test_identical_tables_have_no_changes() {
        let config = Config::default().with_key_columns(vec!["BOM_SID".into(), "SEQ".into()]);
        let result = compute_diff(&old_bom(), &old_bom(), &config).unwrap();
        assert!(result.row_diffs.is_empty());
        assert!(!result.has_changes());
        assert_eq!(result.stats.rows_unchanged, 3);
    }

    #[test]
    fn test_modified_constructor_rejects_empty() {
        assert!(RowDiff::modified("k".into(), Vec::new()).is_none());
    }

    #[test]
    fn test_change_type_inverse() {
        assert_eq!(RowChangeType::Added.inverse(), RowChangeType::Removed);
        assert_eq!(RowChangeType::Modified.inverse(), RowChangeType::Modified);
    }

    #[cfg(feature = "char-diff")]
    #[test]
    fn test_char_level_attaches_model() {
        let diffs = diff_tables(&old_bom(), &new_bom(), &["BOM_SID", "SEQ"], true, true).unwrap();
        let model = diffs[1].cell_diffs()[0].char_diff.as_ref().unwrap();
        assert_eq!(model.old_text(), "500");
        assert_eq!(model.new_text(), "700");
    }

    #[test]
    fn test_injected_adapter_is_used() {
        struct Marker;
        impl CharDiffAdapter for Marker {
            fn compute_char_diff(&self, _old: &str, _new: &str, _ws: bool) -> DiffModel {
                let mut model = DiffModel::default();
                model.push(SpanTag::Equal, "marker");
                model
            }
        }

        let config = Config::default()
            .with_key_columns(vec!["BOM_SID".into(), "SEQ".into()])
            .with_char_level(true);
        let engine = DiffEngine::new(config).with_char_diff(Box::new(Marker));
        let result = engine.diff(&old_bom(), &new_bom()).unwrap();
        let model = result.row_diffs[1].cell_diffs()[0].char_diff.clone().unwrap();
        assert_eq!(model.new_text(), "marker");
    }
}
