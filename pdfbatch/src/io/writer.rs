//! PDF serialization and export.
//!
//! This module provides:
//! - Serialization of a document to bytes, with optional compression
//! - Atomic export of serialized bytes to disk
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfbatch::io::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let stats = writer.export(&bytes, Path::new("merged.pdf")).await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::CompressionLevel;
use crate::error::{PdfBatchError, Result};
use crate::utils::{format_file_size, write_atomic};

/// Options for serializing PDF documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Compress streams before writing.
    pub compress: bool,

    /// Renumber objects densely before writing.
    pub renumber: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::from(CompressionLevel::default())
    }
}

impl From<CompressionLevel> for WriteOptions {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::None => Self {
                compress: false,
                renumber: false,
            },
            CompressionLevel::Standard => Self {
                compress: true,
                renumber: false,
            },
            CompressionLevel::Maximum => Self {
                compress: true,
                renumber: true,
            },
        }
    }
}

/// Statistics about an export.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Serialize a document to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBatchError::SerializeFailed`] if the codec rejects the
    /// document.
    pub fn serialize(&self, doc: &mut Document) -> Result<Vec<u8>> {
        if self.options.compress {
            doc.compress();
        }

        if self.options.renumber {
            doc.renumber_objects();
        }

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|err| PdfBatchError::serialize_failed(err.to_string()))?;

        Ok(buffer)
    }

    /// Write serialized PDF bytes to a file atomically.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the parent directory cannot be created or the
    /// file cannot be written or renamed into place.
    pub async fn export(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();

        write_atomic(path, bytes).await?;

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size: bytes.len() as u64,
            output_path: path.to_path_buf(),
        })
    }
}
