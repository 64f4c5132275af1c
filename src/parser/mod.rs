//! Table providers for the supported file formats

mod csv;
mod excel;
mod json;

use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::json::JsonParser;

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, config: &Config) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser), Box::new(ExcelParser), Box::new(JsonParser)],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => detect_format(path).unwrap_or("csv").to_string(),
        };

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!("Unsupported file format: {}", ext)
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let parser = self.get_parser(path)?;
        let table = parser.parse(path, config)?;
        log::debug!(
            "parsed {}: {} columns, {} rows",
            path.display(),
            table.column_count(),
            table.row_count()
        );
        Ok(table)
    }
}

/// Detect file format from content (for files without extension)
pub fn detect_format(path: &Path) -> Option<&'static str> {
    use std::fs::File;
    use std::io::Read;

    let mut file = File::open(path).ok()?;
    let mut buffer = [0u8; 64];
    let bytes_read = file.read(&mut buffer).ok()?;
    let head = &buffer[..bytes_read];

    // Excel ZIP format (xlsx) and legacy OLE format (xls)
    if head.starts_with(b"PK\x03\x04") {
        return Some("xlsx");
    }
    if head.starts_with(b"\xD0\xCF\x11\xE0") {
        return Some("xls");
    }

    let first = head.iter().find(|b| !b.is_ascii_whitespace())?;
    if *first == b'[' || *first == b'{' {
        return Some("json");
    }

    Some("csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_format() {
        let mut json = tempfile::NamedTempFile::new().unwrap();
        write!(json, "  [{{\"id\": 1}}]").unwrap();
        assert_eq!(detect_format(json.path()), Some("json"));

        let mut csv = tempfile::NamedTempFile::new().unwrap();
        write!(csv, "id,name\n1,a\n").unwrap();
        assert_eq!(detect_format(csv.path()), Some("csv"));
    }

    #[test]
    fn test_get_parser_by_extension() {
        let factory = ParserFactory::new();
        assert!(factory.get_parser(Path::new("data.CSV")).is_ok());
        assert!(factory.get_parser(Path::new("data.xlsx")).is_ok());
        assert!(factory.get_parser(Path::new("data.json")).is_ok());
        assert!(factory.get_parser(Path::new("data.parquet")).is_err());
    }
}
