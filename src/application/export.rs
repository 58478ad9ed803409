//! Delimited-text export of a store's current records.

use csv::WriterBuilder;
use std::fmt;
use std::str::FromStr;

use crate::domain::{DomainError, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// Tab-separated values
    Tsv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Tsv => "text/tab-separated-values",
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "xlsx" => Err(DomainError::validation(
                "xlsx export is not supported; use csv or tsv",
            )),
            other => Err(DomainError::validation(format!(
                "unknown export format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Header row of display names, then one row per record.
pub fn render<R: Resource>(items: &[R], format: ExportFormat) -> Result<Vec<u8>, DomainError> {
    let mut writer = WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(Vec::new());

    writer
        .write_record(R::export_headers())
        .map_err(|e| DomainError::Export(format!("Failed to write header: {}", e)))?;
    for item in items {
        writer
            .write_record(item.export_row())
            .map_err(|e| DomainError::Export(format!("Failed to write row {}: {}", item.id(), e)))?;
    }
    writer
        .flush()
        .map_err(|e| DomainError::Export(format!("Failed to flush output: {}", e)))?;

    writer
        .into_inner()
        .map_err(|e| DomainError::Export(format!("Failed to get output: {}", e)))
}
