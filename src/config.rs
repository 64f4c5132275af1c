//! Configuration handling for tablediff

use std::path::PathBuf;

/// Output format for diff results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

/// Configuration for diff operations
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the old/original file
    pub old_file: PathBuf,
    /// Path to the new file
    pub new_file: PathBuf,
    /// Columns forming the composite key, in key order
    pub key_columns: Vec<String>,
    /// Attach character-level diffs to changed cells
    pub char_level: bool,
    /// Restrict character-level diffs to these columns (empty = all)
    pub char_diff_columns: Vec<String>,
    /// Treat whitespace-only edits as unchanged in character diffs
    pub ignore_whitespace: bool,
    /// Index and compare on the rayon thread pool
    pub parallel: bool,
    /// Output format
    pub output_format: OutputFormat,
    /// For Excel files: which sheet to compare
    pub sheet_name: Option<String>,
    /// Only show statistics, not detailed changes
    pub stats_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            old_file: PathBuf::new(),
            new_file: PathBuf::new(),
            key_columns: Vec::new(),
            char_level: false,
            char_diff_columns: Vec::new(),
            ignore_whitespace: true,
            parallel: true,
            output_format: OutputFormat::default(),
            sheet_name: None,
            stats_only: false,
        }
    }
}

impl Config {
    /// Set key columns for row matching
    pub fn with_key_columns(mut self, keys: Vec<String>) -> Self {
        self.key_columns = keys;
        self
    }

    /// Enable character-level diffs of changed cells
    pub fn with_char_level(mut self, char_level: bool) -> Self {
        self.char_level = char_level;
        self
    }

    /// Limit character-level diffs to some columns
    pub fn with_char_diff_columns(mut self, columns: Vec<String>) -> Self {
        self.char_diff_columns = columns;
        self
    }

    /// Ignore whitespace-only edits in character diffs
    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    /// Toggle parallel indexing and comparison
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
