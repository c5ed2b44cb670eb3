//! PDF decoding from memory and from disk.
//!
//! Input PDFs arrive as byte fields of records, so decoding works on
//! in-memory buffers. File loading exists for seeding tables from disk.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbatch::io::PdfReader;
//!
//! # fn example(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load_bytes(bytes)?;
//! println!("{} pages, {} bytes", loaded.page_count, loaded.byte_size);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::Path;
use tokio::task;

use crate::error::{MergeCause, PdfBatchError, Result};

/// A decoded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Size of the encoded input in bytes.
    pub byte_size: u64,
}

/// PDF reader that opens documents for import.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Decode a PDF held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`MergeCause::Decode`] if the bytes are not a readable PDF or
    /// the document is encrypted.
    pub fn load_bytes(&self, bytes: &[u8]) -> std::result::Result<LoadedPdf, MergeCause> {
        let document = Document::load_mem(bytes).map_err(|err| MergeCause::decode(err.to_string()))?;

        if document.is_encrypted() {
            return Err(MergeCause::decode("document is encrypted"));
        }

        Ok(LoadedPdf {
            page_count: document.get_pages().len(),
            document,
            byte_size: bytes.len() as u64,
        })
    }

    /// Count the pages of a PDF held in memory.
    pub fn page_count(&self, bytes: &[u8]) -> std::result::Result<usize, MergeCause> {
        self.load_bytes(bytes).map(|loaded| loaded.page_count)
    }

    /// Read a PDF file and check that it decodes.
    ///
    /// Returns the raw bytes together with the page count. Decoding runs on
    /// the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBatchError::FailedToLoadPdf`] if the file cannot be read
    /// or is not a readable PDF.
    pub async fn read_file(&self, path: &Path) -> Result<(Vec<u8>, usize)> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| PdfBatchError::failed_to_load_pdf(path.to_path_buf(), err.to_string()))?;

        let reader = self.clone();
        let (bytes, decoded) = task::spawn_blocking(move || {
            let decoded = reader.page_count(&bytes);
            (bytes, decoded)
        })
        .await
        .map_err(|err| PdfBatchError::other(format!("Load task failed: {err}")))?;

        let page_count = decoded
            .map_err(|cause| PdfBatchError::failed_to_load_pdf(path.to_path_buf(), cause.to_string()))?;

        Ok((bytes, page_count))
    }
}
