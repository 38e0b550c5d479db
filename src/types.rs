use crate::naming::DEFAULT_PRECISION;
use serde::Serialize;
use std::path::PathBuf;

/// Identifier of a row. Numbering starts at 1 and is shared by every table
/// of one conversion.
pub type RowId = u64;

/// Position of a table inside a [`TableRegistry`](crate::melt::TableRegistry)
pub type TableIndex = usize;

/// Configuration for a conversion
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Directory that receives one `{table}.csv` per table
    pub output_dir: PathBuf,

    /// Key under which the document root is filed
    pub root_key: String,

    /// Significant digits for numeric cells (`%g` style)
    pub number_precision: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            output_dir: PathBuf::from("."),
            root_key: String::from("root"),
            number_precision: DEFAULT_PRECISION,
        }
    }
}

impl ConvertConfig {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_root_key(mut self, key: impl Into<String>) -> Self {
        self.root_key = key.into();
        self
    }

    pub fn with_number_precision(mut self, precision: usize) -> Self {
        self.number_precision = precision;
        self
    }
}

/// A table whose CSV file was written
#[derive(Debug, Clone, Serialize)]
pub struct WrittenTable {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// A table that could not be written; the rest of the conversion went ahead
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTable {
    pub name: String,
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one conversion
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub written: Vec<WrittenTable>,
    pub skipped: Vec<SkippedTable>,

    /// Cells that held an object or array where a scalar was expected
    pub warnings: usize,
}

impl ConversionReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.written.iter().map(|t| t.rows).sum()
    }
}
