//! Output formatting for diff results

mod json;
mod terminal;

use std::path::Path;

use anyhow::Result;
use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::config::OutputFormat;
use crate::diff::DiffResult;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render diff result to a writer
    fn render(
        &self,
        diff: &DiffResult,
        old_path: &Path,
        new_path: &Path,
        writer: &mut dyn WriteColor,
    ) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Render diff result to stdout
pub fn render_to_stdout(
    diff: &DiffResult,
    old_path: &Path,
    new_path: &Path,
    format: OutputFormat,
    color_choice: ColorChoice,
) -> Result<()> {
    let formatter = OutputFactory::create(format);
    let mut stdout = StandardStream::stdout(color_choice);
    formatter.render(diff, old_path, new_path, &mut stdout)
}
