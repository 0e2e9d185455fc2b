//! CSV ingestion

use crate::error::{Result, StudioError};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Loader for uploaded delimited text
#[derive(Debug, Clone)]
pub struct CsvLoader {
    /// Field separator
    separator: u8,
    /// Rows inspected when inferring column dtypes (`None` scans every row)
    infer_schema_length: Option<usize>,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self {
            separator: b',',
            infer_schema_length: None,
        }
    }

    /// Set the field separator
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Set how many rows are used for dtype inference (`None` scans everything)
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Parse UTF-8 CSV bytes with a mandatory header row
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<DataFrame> {
        std::str::from_utf8(bytes)
            .map_err(|e| StudioError::IngestParse(format!("input is not valid UTF-8: {}", e)))?;

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(StudioError::IngestParse("file is empty".to_string()));
        }

        let parse_opts = CsvParseOptions::default().with_separator(self.separator);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| StudioError::IngestParse(e.to_string()))
    }

    /// Read a CSV file from disk
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let bytes = std::fs::read(path.as_ref())?;
        self.load_bytes(&bytes)
    }
}
