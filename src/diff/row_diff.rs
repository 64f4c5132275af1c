//! Row matching algorithm

use rayon::prelude::*;

use crate::config::Config;
use crate::error::{Result, TableSide};
use crate::model::{index_table, KeyIndex, Row, Table};

use super::cell_diff::CellComparator;
use super::char_diff::CharDiffAdapter;
use super::RowDiff;

/// Matches rows of two tables by composite key and classifies each key.
///
/// Output order: removed and modified rows in old-table order, then added
/// rows in new-table order. The parallel path yields exactly the same list.
pub struct RowMatcher<'a> {
    config: &'a Config,
    char_diff: Option<&'a dyn CharDiffAdapter>,
}

impl<'a> RowMatcher<'a> {
    pub fn new(config: &'a Config, char_diff: Option<&'a dyn CharDiffAdapter>) -> Self {
        Self { config, char_diff }
    }

    /// Diff two tables into an ordered list of row changes
    pub fn diff(&self, old_table: &'a Table, new_table: &'a Table) -> Result<Vec<RowDiff>> {
        let keys = &self.config.key_columns;
        let (old_index, new_index) = if self.config.parallel {
            let (old, new) = rayon::join(
                || index_table(old_table, keys, TableSide::Old),
                || index_table(new_table, keys, TableSide::New),
            );
            (old?, new?)
        } else {
            (
                index_table(old_table, keys, TableSide::Old)?,
                index_table(new_table, keys, TableSide::New)?,
            )
        };

        let comparator = CellComparator::new(old_table, new_table, self.config, self.char_diff)?;

        let mut result = self.removed_and_modified(&old_index, &new_index, &comparator)?;
        result.extend(
            new_index
                .keys()
                .filter(|key| !old_index.contains_key(*key))
                .map(|key| RowDiff::added(key.clone())),
        );

        Ok(result)
    }

    fn removed_and_modified(
        &self,
        old_index: &KeyIndex<'a>,
        new_index: &KeyIndex<'a>,
        comparator: &CellComparator<'a>,
    ) -> Result<Vec<RowDiff>> {
        let classify = |(key, old_row): (&String, &&Row)| -> Result<Option<RowDiff>> {
            match new_index.get(key) {
                None => Ok(Some(RowDiff::removed(key.clone()))),
                Some(new_row) => {
                    let cells = comparator.compare_rows(old_row, new_row)?;
                    Ok(RowDiff::modified(key.clone(), cells))
                }
            }
        };

        let classified: Vec<Option<RowDiff>> = if self.config.parallel {
            let entries: Vec<_> = old_index.iter().collect();
            entries
                .into_par_iter()
                .map(classify)
                .collect::<Result<Vec<_>>>()?
        } else {
            old_index.iter().map(classify).collect::<Result<Vec<_>>>()?
        };

        Ok(classified.into_iter().flatten().collect())
    }
}
