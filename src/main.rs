//! tablediff - Key-based structural diff for tabular data

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use termcolor::ColorChoice;

use tablediff::config::{Config, OutputFormat};
use tablediff::diff::DiffEngine;
use tablediff::model::detect_key_columns;
use tablediff::output::render_to_stdout;
use tablediff::parser::ParserFactory;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliColor {
    Auto,
    Always,
    Never,
}

impl From<CliColor> for ColorChoice {
    fn from(c: CliColor) -> Self {
        match c {
            CliColor::Auto => {
                if std::io::IsTerminal::is_terminal(&std::io::stdout()) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                }
            }
            CliColor::Always => ColorChoice::Always,
            CliColor::Never => ColorChoice::Never,
        }
    }
}

/// Key-based structural diff for tabular data (CSV, Excel, JSON)
#[derive(Parser, Debug)]
#[command(name = "tablediff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Old/original file to compare
    old_file: PathBuf,

    /// New file to compare
    new_file: PathBuf,

    /// Column(s) forming the composite key (comma-separated, in key order).
    /// Defaults to the first column with unique values.
    #[arg(short, long, value_delimiter = ',')]
    key: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Attach character-level diffs to changed cells
    #[arg(long)]
    char_level: bool,

    /// Only compute character-level diffs for these columns (comma-separated)
    #[arg(long, value_delimiter = ',', requires = "char_level")]
    char_column: Vec<String>,

    /// Report whitespace-only edits in character-level diffs
    #[arg(long)]
    no_ignore_whitespace: bool,

    /// For Excel files: which sheet to compare
    #[arg(long)]
    sheet: Option<String>,

    /// Only show statistics, not detailed changes
    #[arg(long)]
    stats_only: bool,

    /// Run on a single thread
    #[arg(long)]
    sequential: bool,

    /// When to color terminal output
    #[arg(long, value_enum, default_value = "auto")]
    color: CliColor,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match run(cli) {
        Ok(has_changes) => {
            if has_changes {
                ExitCode::from(1) // Differences found
            } else {
                ExitCode::SUCCESS // No differences
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let mut config = Config {
        old_file: cli.old_file.clone(),
        new_file: cli.new_file.clone(),
        key_columns: cli.key,
        char_level: cli.char_level,
        char_diff_columns: cli.char_column,
        ignore_whitespace: !cli.no_ignore_whitespace,
        parallel: !cli.sequential,
        output_format: cli.format.into(),
        sheet_name: cli.sheet,
        stats_only: cli.stats_only,
    };

    // Parse files
    let factory = ParserFactory::new();

    let old_table = factory
        .parse(&config.old_file, &config)
        .with_context(|| format!("Failed to parse old file: {}", config.old_file.display()))?;

    let new_table = factory
        .parse(&config.new_file, &config)
        .with_context(|| format!("Failed to parse new file: {}", config.new_file.display()))?;

    if config.key_columns.is_empty() {
        config.key_columns = detect_key_columns(&old_table);
        if config.key_columns.is_empty() {
            bail!("No column with unique values found; pass key columns with --key");
        }
        log::info!("using detected key column(s): {}", config.key_columns.join(","));
    }

    let engine = DiffEngine::new(config);
    let diff = engine.diff(&old_table, &new_table)?;
    let config = engine.config();

    // Handle stats-only mode
    if config.stats_only {
        println!("Old file: {} ({} rows)", config.old_file.display(), diff.stats.old_row_count);
        println!("New file: {} ({} rows)", config.new_file.display(), diff.stats.new_row_count);
        println!();
        println!("Added:     {}", diff.stats.rows_added);
        println!("Removed:   {}", diff.stats.rows_removed);
        println!("Modified:  {}", diff.stats.rows_modified);
        println!("Unchanged: {}", diff.stats.rows_unchanged);
        println!("Cells changed: {}", diff.stats.cells_changed);
        return Ok(diff.has_changes());
    }

    render_to_stdout(
        &diff,
        &config.old_file,
        &config.new_file,
        config.output_format,
        cli.color.into(),
    )?;

    Ok(diff.has_changes())
}
