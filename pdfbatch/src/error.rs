//! Error types for pdfbatch.
//!
//! All fallible operations in the library return [`PdfBatchError`]. Merge
//! failures carry the display name and sequence number of the entry that
//! broke the batch so the caller can report exactly which input to fix.
//!
//! # Error Categories
//!
//! - **Merge Errors**: an entry could not be decoded or its pages copied
//! - **Record Errors**: missing or mistyped fields, unknown tables
//! - **Store Errors**: the record source or sink failed
//! - **Configuration Errors**: invalid settings

use std::io;
use std::path::PathBuf;

use crate::record::TableId;

/// Result type alias for pdfbatch operations.
pub type Result<T> = std::result::Result<T, PdfBatchError>;

/// Why a single entry could not be merged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeCause {
    /// The content is not a readable PDF.
    #[error("could not decode PDF: {reason}")]
    Decode {
        /// Message from the PDF codec.
        reason: String,
    },

    /// A page of an otherwise readable PDF could not be moved into the output.
    #[error("could not copy page {page}: {reason}")]
    PageCopy {
        /// 1-indexed page number within the source document.
        page: u32,
        /// What was wrong with the page.
        reason: String,
    },
}

impl MergeCause {
    /// Create a Decode cause.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Create a PageCopy cause.
    pub fn page_copy(page: u32, reason: impl Into<String>) -> Self {
        Self::PageCopy {
            page,
            reason: reason.into(),
        }
    }
}

/// Main error type for pdfbatch operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfBatchError {
    /// An entry aborted the merge. No output is produced.
    #[error("Error processing file '{name}' (sequence: {sequence}): {cause}")]
    MergeFailed {
        /// Display name of the offending entry.
        name: String,
        /// Sequence number of the offending entry.
        sequence: i64,
        /// Underlying decode or page-copy failure.
        #[source]
        cause: MergeCause,
    },

    /// The merged document could not be serialized.
    #[error("Failed to serialize merged document: {reason}")]
    SerializeFailed {
        /// Message from the PDF codec.
        reason: String,
    },

    /// A PDF file on disk could not be loaded.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", .path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A required field is absent or null.
    #[error("Missing required field '{column}' in table {table}")]
    MissingField {
        /// Table the row belongs to.
        table: TableId,
        /// Column that was looked up.
        column: String,
    },

    /// A field holds a value of the wrong type.
    #[error("Field '{column}' in table {table} holds {found}, expected {expected}")]
    FieldType {
        /// Table the row belongs to.
        table: TableId,
        /// Column that was looked up.
        column: String,
        /// Expected value kind.
        expected: &'static str,
        /// Actual value kind.
        found: &'static str,
    },

    /// The store has no table with this id.
    #[error("Unknown table: {table}")]
    UnknownTable {
        /// Requested table.
        table: TableId,
    },

    /// Reading from the record source failed.
    #[error("Record source failed: {reason}")]
    SourceFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Writing to the record sink failed.
    #[error("Record sink failed: {reason}")]
    SinkFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// A table file could not be parsed or encoded.
    #[error("Malformed table data: {source}")]
    Json {
        /// Underlying serde_json error.
        #[from]
        source: serde_json::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl PdfBatchError {
    /// Create a MergeFailed error for the given entry.
    pub fn merge_failed(name: impl Into<String>, sequence: i64, cause: MergeCause) -> Self {
        Self::MergeFailed {
            name: name.into(),
            sequence,
            cause,
        }
    }

    /// Create a SerializeFailed error.
    pub fn serialize_failed(reason: impl Into<String>) -> Self {
        Self::SerializeFailed {
            reason: reason.into(),
        }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a MissingField error.
    pub fn missing_field(table: TableId, column: impl Into<String>) -> Self {
        Self::MissingField {
            table,
            column: column.into(),
        }
    }

    /// Create an UnknownTable error.
    pub fn unknown_table(table: TableId) -> Self {
        Self::UnknownTable { table }
    }

    /// Create a SourceFailed error.
    pub fn source_failed(reason: impl Into<String>) -> Self {
        Self::SourceFailed {
            reason: reason.into(),
        }
    }

    /// Create a SinkFailed error.
    pub fn sink_failed(reason: impl Into<String>) -> Self {
        Self::SinkFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error was raised by a bad input entry.
    pub fn is_merge_failure(&self) -> bool {
        matches!(self, Self::MergeFailed { .. })
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig { .. } => 1,
            Self::UnknownTable { .. } => 2,
            Self::MissingField { .. } => 2,
            Self::FieldType { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::MergeFailed { .. } => 3,
            Self::SourceFailed { .. } => 4,
            Self::SinkFailed { .. } => 5,
            Self::Io { .. } => 5,
            Self::Json { .. } => 5,
            Self::SerializeFailed { .. } => 6,
            Self::Other { .. } => 1,
        }
    }
}
