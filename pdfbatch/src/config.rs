//! Batch configuration.
//!
//! A [`Config`] names the tables of a batch, the binding id that ties input
//! rows to the output row, and the columns to read and write. It can be
//! built directly, or resolved from a trigger row the way a workflow
//! engine hands it over.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{PdfBatchError, Result};
use crate::observer::BatchObserver;
use crate::record::{FieldValue, Query, Row, SortDirection, TableId};

/// Output filename used when the trigger row leaves it blank.
pub const DEFAULT_OUTPUT_FILENAME: &str = "merged.pdf";

/// Maximum number of input rows fetched for one batch.
pub const DEFAULT_ROW_LIMIT: usize = 1000;

/// Trigger row column holding the output filename.
pub const TRIGGER_FILENAME: &str = "MergedFilename";

/// Trigger row column holding the input table id.
pub const TRIGGER_INPUT_TABLE: &str = "InputTableId";

/// Trigger row column holding the output table id.
pub const TRIGGER_OUTPUT_TABLE: &str = "OutputTableId";

/// Trigger row column holding the binding id.
pub const TRIGGER_BINDING: &str = "ManagedBindingID";

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - streams are written as merged.
    None,
    /// Compress streams.
    #[default]
    Standard,
    /// Compress streams and renumber objects densely.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfBatchError;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfBatchError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Column names used on the input and output tables.
///
/// The defaults match the table layout the merge workflow was built for.
/// Any subset can be overridden from TOML:
///
/// ```
/// use pdfbatch::config::ColumnMap;
///
/// let columns = ColumnMap::from_toml_str(r#"sequence = "Position""#).unwrap();
/// assert_eq!(columns.sequence, "Position");
/// assert_eq!(columns.content, "PDF Content");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMap {
    /// Input column holding the sequence number.
    pub sequence: String,
    /// Input column holding the PDF bytes.
    pub content: String,
    /// Input column holding the display name.
    pub name: String,
    /// Column holding the binding id, on both tables.
    pub binding: String,
    /// Output column receiving the filename.
    pub output_filename: String,
    /// Output column receiving the merged bytes.
    pub output_content: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            sequence: "Seq nr".to_string(),
            content: "PDF Content".to_string(),
            name: "Filename".to_string(),
            binding: "ManagedBindingID".to_string(),
            output_filename: "Filename".to_string(),
            output_content: "Content".to_string(),
        }
    }
}

impl ColumnMap {
    /// Parse a column map from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|err| PdfBatchError::invalid_config(format!("Invalid column map: {err}")))
    }

    /// Load a column map from a TOML file.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&text)
    }

    /// Build an input row for one PDF.
    pub fn input_row(
        &self,
        table: TableId,
        binding_id: Uuid,
        sequence: i64,
        name: &str,
        content: Vec<u8>,
    ) -> Row {
        Row::new(table)
            .with(&self.sequence, sequence)
            .with(&self.name, name)
            .with(&self.content, content)
            .with(&self.binding, binding_id)
    }

    fn validate(&self) -> Result<()> {
        let columns = [
            ("sequence", &self.sequence),
            ("content", &self.content),
            ("name", &self.name),
            ("binding", &self.binding),
            ("output_filename", &self.output_filename),
            ("output_content", &self.output_content),
        ];

        for (key, column) in columns {
            if column.trim().is_empty() {
                return Err(PdfBatchError::invalid_config(format!(
                    "Column name for '{key}' must not be empty"
                )));
            }
        }

        if self.output_filename == self.output_content {
            return Err(PdfBatchError::invalid_config(
                "Output filename and content columns must differ",
            ));
        }

        Ok(())
    }
}

/// Configuration of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Filename stored on the output row.
    pub output_filename: String,

    /// Table holding the input PDFs.
    pub input_table: TableId,

    /// Table receiving the merged PDF.
    pub output_table: TableId,

    /// Id shared by the input rows and the output row.
    pub binding_id: Uuid,

    /// Maximum number of input rows to fetch.
    pub row_limit: usize,

    /// Column names.
    pub columns: ColumnMap,

    /// Compression applied to the merged PDF.
    pub compression: CompressionLevel,
}

impl Config {
    /// Create a configuration with default filename, limit and columns.
    pub fn new(input_table: TableId, output_table: TableId, binding_id: Uuid) -> Self {
        Self {
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            input_table,
            output_table,
            binding_id,
            row_limit: DEFAULT_ROW_LIMIT,
            columns: ColumnMap::default(),
            compression: CompressionLevel::default(),
        }
    }

    /// Resolve a configuration from a trigger row.
    ///
    /// The table and binding ids are required. A blank or missing filename
    /// falls back to [`DEFAULT_OUTPUT_FILENAME`] and is reported to the
    /// observer.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBatchError::MissingField`] or [`PdfBatchError::FieldType`]
    /// if an id column is absent or does not hold an id.
    pub fn from_trigger_row(row: &Row, observer: &dyn BatchObserver) -> Result<Self> {
        let input_table = TableId::from_uuid(row.require_id(TRIGGER_INPUT_TABLE)?);
        let output_table = TableId::from_uuid(row.require_id(TRIGGER_OUTPUT_TABLE)?);
        let binding_id = row.require_id(TRIGGER_BINDING)?;

        let mut config = Self::new(input_table, output_table, binding_id);
        config.output_filename =
            resolve_output_filename(row.text(TRIGGER_FILENAME), TRIGGER_FILENAME, observer);

        Ok(config)
    }

    /// Set the output filename. Blank names fall back to the default.
    pub fn with_output_filename(mut self, filename: Option<&str>, observer: &dyn BatchObserver) -> Self {
        self.output_filename = resolve_output_filename(filename, TRIGGER_FILENAME, observer);
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBatchError::InvalidConfig`] if the row limit is zero, the
    /// filename is blank, or a column name is empty.
    pub fn validate(&self) -> Result<()> {
        if self.row_limit == 0 {
            return Err(PdfBatchError::invalid_config("Row limit must be at least 1"));
        }

        if self.output_filename.trim().is_empty() {
            return Err(PdfBatchError::invalid_config("Output filename must not be empty"));
        }

        self.columns.validate()
    }

    /// Query selecting the batch's input rows in sequence order.
    pub fn input_query(&self) -> Query {
        Query::select(self.input_table)
            .where_eq(&self.columns.binding, FieldValue::Id(self.binding_id))
            .order_by(&self.columns.sequence, SortDirection::Ascending)
            .limit(self.row_limit)
    }

    /// Query fetching a single output row to use as a template.
    pub fn output_template_query(&self) -> Query {
        Query::select(self.output_table).limit(1)
    }
}

fn resolve_output_filename(value: Option<&str>, column: &str, observer: &dyn BatchObserver) -> String {
    match value.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            observer.field_defaulted(column, DEFAULT_OUTPUT_FILENAME);
            DEFAULT_OUTPUT_FILENAME.to_string()
        }
    }
}
