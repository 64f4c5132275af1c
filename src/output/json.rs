//! JSON output format

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use termcolor::WriteColor;

use crate::diff::{DiffResult, DiffStats, RowDiff, SchemaChange};

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonDiffOutput<'a> {
    old_file: String,
    new_file: String,
    schema_changes: &'a [SchemaChange],
    row_diffs: &'a [RowDiff],
    stats: &'a DiffStats,
}

impl OutputFormatter for JsonOutput {
    fn render(
        &self,
        diff: &DiffResult,
        old_path: &Path,
        new_path: &Path,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        let output = JsonDiffOutput {
            old_file: old_path.display().to_string(),
            new_file: new_path.display().to_string(),
            schema_changes: &diff.schema_changes,
            row_diffs: &diff.row_diffs,
            stats: &diff.stats,
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{CellDiff, DiffModel, SpanTag};
    use serde_json::{json, Value};
    use termcolor::NoColor;

    fn render(diff: &DiffResult) -> Value {
        let mut out = NoColor::new(Vec::new());
        JsonOutput::compact()
            .render(diff, Path::new("old.csv"), Path::new("new.csv"), &mut out)
            .unwrap();
        serde_json::from_slice(&out.into_inner()).unwrap()
    }

    #[test]
    fn test_row_diff_shape() {
        let mut model = DiffModel::default();
        model.push(SpanTag::Delete, "5");
        model.push(SpanTag::Insert, "7");
        model.push(SpanTag::Equal, "00");

        let diff = DiffResult {
            row_diffs: vec![
                RowDiff::removed("5000||02".into()),
                RowDiff::modified(
                    "5000||03".into(),
                    vec![CellDiff {
                        column: "AMOUNT".into(),
                        old_value: "500".into(),
                        new_value: "700".into(),
                        char_diff: Some(model),
                    }],
                )
                .unwrap(),
            ],
            ..Default::default()
        };

        let value = render(&diff);
        assert_eq!(value["old_file"], "old.csv");
        assert_eq!(value["row_diffs"][0], json!({"type": "removed", "key": "5000||02"}));
        assert_eq!(
            value["row_diffs"][1],
            json!({
                "type": "modified",
                "key": "5000||03",
                "cells": [{
                    "column": "AMOUNT",
                    "old_value": "500",
                    "new_value": "700",
                    "char_diff": [
                        {"tag": "delete", "text": "5"},
                        {"tag": "insert", "text": "7"},
                        {"tag": "equal", "text": "00"}
                    ]
                }]
            })
        );
        assert_eq!(value["stats"]["rows_added"], 0);
    }
}
