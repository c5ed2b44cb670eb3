//! Batch events and their receivers.
//!
//! The engine and the orchestrator never log directly. They report to a
//! [`BatchObserver`], which decides what to do with each event.

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::error::PdfBatchError;
use crate::merge::{InputEntry, MergeStatistics, MergedDocument};

/// Receiver for the events of a batch.
///
/// Every method has a no-op default so implementors only override what they
/// care about.
pub trait BatchObserver: Send + Sync {
    /// An entry had no content and was left out of the merge.
    fn entry_skipped(&self, entry: &InputEntry) {
        let _ = entry;
    }

    /// An optional field was absent and a default was used instead.
    fn field_defaulted(&self, column: &str, default: &str) {
        let _ = (column, default);
    }

    /// The input fetch returned `count` rows.
    fn rows_received(&self, count: usize) {
        let _ = count;
    }

    /// The input fetch hit the row limit, so rows may be missing.
    fn batch_possibly_truncated(&self, limit: usize) {
        let _ = limit;
    }

    /// The merged document was stored.
    fn batch_merged(&self, document: &MergedDocument, statistics: &MergeStatistics) {
        let _ = (document, statistics);
    }

    /// The batch failed and nothing was written.
    fn batch_failed(&self, error: &PdfBatchError) {
        let _ = error;
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl BatchObserver for TracingObserver {
    fn entry_skipped(&self, entry: &InputEntry) {
        warn!(
            name = %entry.name,
            sequence = entry.sequence,
            "Skipping '{}' (sequence: {}): no content",
            entry.name,
            entry.sequence
        );
    }

    fn field_defaulted(&self, column: &str, default: &str) {
        warn!(column, default, "Field '{column}' is empty, using '{default}'");
    }

    fn rows_received(&self, count: usize) {
        info!(count, "Records received: {count}");
    }

    fn batch_possibly_truncated(&self, limit: usize) {
        warn!(
            limit,
            "Fetch returned {limit} rows, the row limit; the batch may be incomplete"
        );
    }

    fn batch_merged(&self, document: &MergedDocument, statistics: &MergeStatistics) {
        info!(
            filename = %document.filename,
            pages = statistics.total_pages,
            merged = statistics.entries_merged,
            skipped = statistics.entries_skipped,
            "Added merged pdf to table"
        );
    }

    fn batch_failed(&self, error: &PdfBatchError) {
        error!(%error, "Batch failed");
    }
}

/// An event captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    /// See [`BatchObserver::entry_skipped`].
    EntrySkipped {
        /// Display name of the skipped entry.
        name: String,
        /// Sequence number of the skipped entry.
        sequence: i64,
    },
    /// See [`BatchObserver::field_defaulted`].
    FieldDefaulted {
        /// Column that was absent.
        column: String,
        /// Value used instead.
        default: String,
    },
    /// See [`BatchObserver::rows_received`].
    RowsReceived {
        /// Number of rows fetched.
        count: usize,
    },
    /// See [`BatchObserver::batch_possibly_truncated`].
    PossiblyTruncated {
        /// Row limit that was reached.
        limit: usize,
    },
    /// See [`BatchObserver::batch_merged`].
    BatchMerged {
        /// Output filename.
        filename: String,
        /// Pages in the merged document.
        total_pages: usize,
    },
    /// See [`BatchObserver::batch_failed`].
    BatchFailed {
        /// Rendered error message.
        message: String,
    },
}

impl ObservedEvent {
    /// Check if this event is reported as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::EntrySkipped { .. } | Self::FieldDefaulted { .. } | Self::PossiblyTruncated { .. }
        )
    }
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far, in order.
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    /// Events reported as warnings.
    pub fn warnings(&self) -> Vec<ObservedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.is_warning())
            .cloned()
            .collect()
    }

    fn record(&self, event: ObservedEvent) {
        self.events.lock().push(event);
    }
}

impl BatchObserver for RecordingObserver {
    fn entry_skipped(&self, entry: &InputEntry) {
        self.record(ObservedEvent::EntrySkipped {
            name: entry.name.clone(),
            sequence: entry.sequence,
        });
    }

    fn field_defaulted(&self, column: &str, default: &str) {
        self.record(ObservedEvent::FieldDefaulted {
            column: column.to_string(),
            default: default.to_string(),
        });
    }

    fn rows_received(&self, count: usize) {
        self.record(ObservedEvent::RowsReceived { count });
    }

    fn batch_possibly_truncated(&self, limit: usize) {
        self.record(ObservedEvent::PossiblyTruncated { limit });
    }

    fn batch_merged(&self, document: &MergedDocument, statistics: &MergeStatistics) {
        self.record(ObservedEvent::BatchMerged {
            filename: document.filename.clone(),
            total_pages: statistics.total_pages,
        });
    }

    fn batch_failed(&self, error: &PdfBatchError) {
        self.record(ObservedEvent::BatchFailed {
            message: error.to_string(),
        });
    }
}
