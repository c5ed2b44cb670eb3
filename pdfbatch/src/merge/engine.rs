//! Ordered, fail-fast merge of an entry set into one document.

use lopdf::Document;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::CompressionLevel;
use crate::error::Result;
use crate::io::{PdfReader, PdfWriter, WriteOptions};
use crate::merge::entry::OrderedEntrySet;
use crate::merge::pages::OutputDocument;
use crate::observer::BatchObserver;
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStatistics {
    /// Number of entries whose pages were added.
    pub entries_merged: usize,

    /// Number of entries left out for lack of content.
    pub entries_skipped: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total size of the merged inputs in bytes.
    pub input_size: u64,

    /// Time taken to decode and import all entries.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of [`MergeEngine::merge`].
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The serialized merged PDF.
    pub content: Vec<u8>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// Merges ordered entries page by page into one PDF.
///
/// Entries are processed strictly in the order of the set. Empty entries are
/// reported to the observer and skipped; the first entry that cannot be
/// decoded or copied aborts the whole merge.
#[derive(Clone)]
pub struct MergeEngine {
    observer: Arc<dyn BatchObserver>,
    reader: PdfReader,
    writer: PdfWriter,
}

impl MergeEngine {
    /// Create an engine reporting to `observer`, with standard compression.
    pub fn new(observer: Arc<dyn BatchObserver>) -> Self {
        Self {
            observer,
            reader: PdfReader::new(),
            writer: PdfWriter::new(),
        }
    }

    /// Use a different compression level for the serialized output.
    pub fn with_compression(mut self, level: CompressionLevel) -> Self {
        self.writer = PdfWriter::with_options(WriteOptions::from(level));
        self
    }

    /// Merge entries into a serialized PDF.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PdfBatchError::MergeFailed`] naming the first entry
    /// that could not be merged, or
    /// [`crate::PdfBatchError::SerializeFailed`] if the result cannot be
    /// encoded.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfbatch::merge::{MergeEngine, OrderedEntrySet};
    /// # use pdfbatch::observer::NoopObserver;
    /// # use std::sync::Arc;
    /// # fn example(entries: OrderedEntrySet) -> pdfbatch::Result<()> {
    /// let engine = MergeEngine::new(Arc::new(NoopObserver));
    /// let outcome = engine.merge(entries)?;
    /// println!("{} pages, {} bytes", outcome.statistics.total_pages, outcome.content.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn merge(&self, entries: OrderedEntrySet) -> Result<MergeOutcome> {
        let (mut document, statistics) = self.merge_document(entries)?;
        let content = self.writer.serialize(&mut document)?;

        Ok(MergeOutcome {
            content,
            statistics,
        })
    }

    /// Merge entries into an in-memory document without serializing it.
    pub fn merge_document(&self, entries: OrderedEntrySet) -> Result<(Document, MergeStatistics)> {
        let start = Instant::now();
        let mut output = OutputDocument::new();
        let mut statistics = MergeStatistics::default();

        for entry in entries {
            if entry.is_empty() {
                self.observer.entry_skipped(&entry);
                statistics.entries_skipped += 1;
                continue;
            }

            let loaded = self
                .reader
                .load_bytes(&entry.content)
                .map_err(|cause| entry.failure(cause))?;
            let input_size = loaded.byte_size;

            let added = output
                .import_pages(loaded.document)
                .map_err(|cause| entry.failure(cause))?;

            statistics.entries_merged += 1;
            statistics.total_pages += added;
            statistics.input_size += input_size;
        }

        let document = output.finish();
        statistics.merge_time = start.elapsed();

        Ok((document, statistics))
    }
}
