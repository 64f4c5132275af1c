//! Colored terminal output

use std::path::Path;

use anyhow::Result;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::diff::{CellDiff, DiffModel, DiffResult, RowChangeType, RowDiff, SchemaChange, SpanTag};

use super::OutputFormatter;

/// Terminal output, colored when the writer supports it
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }

    fn write_header(&self, writer: &mut dyn WriteColor, old_path: &Path, new_path: &Path) -> Result<()> {
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            writer,
            " tablediff: {} → {}",
            old_path.display(),
            new_path.display()
        )?;
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_schema_changes(&self, changes: &[SchemaChange], writer: &mut dyn WriteColor) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        writeln!(writer, "Schema Changes:")?;
        for change in changes {
            writeln!(writer, "  {}", change)?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn write_summary(&self, diff: &DiffResult, writer: &mut dyn WriteColor) -> Result<()> {
        writeln!(
            writer,
            "Summary: +{} added, -{} removed, ~{} modified (out of {} → {} rows)",
            diff.stats.rows_added,
            diff.stats.rows_removed,
            diff.stats.rows_modified,
            diff.stats.old_row_count,
            diff.stats.new_row_count
        )?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_row_diff(&self, row: &RowDiff, writer: &mut dyn WriteColor) -> Result<()> {
        let (marker, color) = match row.change_type {
            RowChangeType::Added => ('+', Color::Green),
            RowChangeType::Removed => ('-', Color::Red),
            RowChangeType::Modified => ('~', Color::Yellow),
        };

        writer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(writer, "{} {}", marker, row.key)?;
        writer.reset()?;
        writeln!(writer)?;

        for cell in row.cell_diffs() {
            self.write_cell_diff(cell, writer)?;
        }
        Ok(())
    }

    fn write_cell_diff(&self, cell: &CellDiff, writer: &mut dyn WriteColor) -> Result<()> {
        writeln!(
            writer,
            "    {}: {} → {}",
            cell.column, cell.old_value, cell.new_value
        )?;
        if let Some(model) = &cell.char_diff {
            write!(writer, "      ")?;
            self.write_char_diff(model, writer)?;
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Inline spans; word-diff style markers when color is unavailable
    fn write_char_diff(&self, model: &DiffModel, writer: &mut dyn WriteColor) -> Result<()> {
        let colored = writer.supports_color();
        for span in &model.spans {
            match span.tag {
                SpanTag::Equal => write!(writer, "{}", span.text)?,
                SpanTag::Delete if colored => {
                    writer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_strikethrough(true))?;
                    write!(writer, "{}", span.text)?;
                    writer.reset()?;
                }
                SpanTag::Insert if colored => {
                    writer.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_underline(true))?;
                    write!(writer, "{}", span.text)?;
                    writer.reset()?;
                }
                SpanTag::Delete => write!(writer, "[-{}-]", span.text)?,
                SpanTag::Insert => write!(writer, "{{+{}+}}", span.text)?,
            }
        }
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(
        &self,
        diff: &DiffResult,
        old_path: &Path,
        new_path: &Path,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        self.write_header(writer, old_path, new_path)?;

        if !diff.has_changes() {
            writeln!(writer, "No differences found.")?;
            return Ok(());
        }

        self.write_schema_changes(&diff.schema_changes, writer)?;
        self.write_summary(diff, writer)?;
        for row in &diff.row_diffs {
            self.write_row_diff(row, writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    fn render(diff: &DiffResult) -> String {
        let mut out = NoColor::new(Vec::new());
        TerminalOutput::new()
            .render(diff, Path::new("old.csv"), Path::new("new.csv"), &mut out)
            .unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_no_differences() {
        let text = render(&DiffResult::default());
        assert!(text.contains("tablediff: old.csv → new.csv"));
        assert!(text.contains("No differences found."));
    }

    #[test]
    fn test_rows_in_result_order() {
        let mut model = DiffModel::default();
        model.push(SpanTag::Delete, "5");
        model.push(SpanTag::Insert, "7");
        model.push(SpanTag::Equal, "00");

        let mut diff = DiffResult {
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
                RowDiff::added("5000||04".into()),
            ],
            ..Default::default()
        };
        diff.stats.rows_added = 1;
        diff.stats.rows_removed = 1;
        diff.stats.rows_modified = 1;

        let text = render(&diff);
        let removed = text.find("- 5000||02").unwrap();
        let modified = text.find("~ 5000||03").unwrap();
        let added = text.find("+ 5000||04").unwrap();
        assert!(removed < modified && modified < added);
        assert!(text.contains("    AMOUNT: 500 → 700"));
        assert!(text.contains("[-5-]{+7+}00"));
        assert!(text.contains("Summary: +1 added, -1 removed, ~1 modified"));
    }
}
