//! End-to-end execution of one batch.
//!
//! The orchestrator fetches the batch's input rows in sequence order, maps
//! them to typed entries, merges them on the blocking pool and writes the
//! merged document back as one output row tagged with the binding id.
//! Nothing is written when any step fails.

use std::sync::Arc;
use tokio::task;

use crate::config::Config;
use crate::error::{PdfBatchError, Result};
use crate::merge::{InputEntry, MergeEngine, MergeStatistics, MergedDocument, OrderedEntrySet};
use crate::observer::BatchObserver;
use crate::record::{FieldValue, RecordSink, RecordSource, Row, RowSet};

/// Summary of a successful batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Number of input rows fetched.
    pub rows_received: usize,

    /// Statistics from the merge.
    pub statistics: MergeStatistics,

    /// The document written to the output table.
    pub document: MergedDocument,
}

/// Runs a batch from a record source to a record sink.
pub struct Orchestrator<S, K> {
    config: Config,
    source: S,
    sink: K,
    observer: Arc<dyn BatchObserver>,
}

impl<S, K> Orchestrator<S, K>
where
    S: RecordSource,
    K: RecordSink,
{
    /// Create an orchestrator for one batch.
    pub fn new(config: Config, source: S, sink: K, observer: Arc<dyn BatchObserver>) -> Self {
        Self {
            config,
            source,
            sink,
            observer,
        }
    }

    /// Configuration of the batch.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the batch.
    ///
    /// Any failure is reported through [`BatchObserver::batch_failed`] before
    /// it is returned.
    ///
    /// # Errors
    ///
    /// Returns the first error met: invalid configuration, a source or sink
    /// failure, a missing or mistyped field, or a merge failure.
    pub async fn run(&self) -> Result<BatchReport> {
        match self.execute().await {
            Ok(report) => Ok(report),
            Err(err) => {
                self.observer.batch_failed(&err);
                Err(err)
            }
        }
    }

    async fn execute(&self) -> Result<BatchReport> {
        self.config.validate()?;

        let rows = self.source.fetch(&self.config.input_query()).await?;
        let rows_received = rows.len();
        self.observer.rows_received(rows_received);
        if rows_received == self.config.row_limit {
            self.observer.batch_possibly_truncated(self.config.row_limit);
        }

        let entries = self.entries_from_rows(&rows)?;
        let template = self
            .source
            .fetch(&self.config.output_template_query())
            .await?;

        let engine = MergeEngine::new(self.observer.clone()).with_compression(self.config.compression);
        let outcome = task::spawn_blocking(move || engine.merge(entries))
            .await
            .map_err(|err| PdfBatchError::other(format!("Merge task failed: {err}")))??;

        let document = MergedDocument::new(self.config.output_filename.clone(), outcome.content);

        let columns = &self.config.columns;
        let mut row = self.sink.create_row(&template).await?;
        row.set(&columns.output_filename, document.filename.as_str());
        row.set(&columns.output_content, document.content.clone());
        row.set(&columns.binding, self.config.binding_id);
        self.sink.insert(row).await?;

        self.observer.batch_merged(&document, &outcome.statistics);

        Ok(BatchReport {
            rows_received,
            statistics: outcome.statistics,
            document,
        })
    }

    /// Map fetched rows to entries, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBatchError::MissingField`] or [`PdfBatchError::FieldType`]
    /// if a row has no integer sequence or holds non-byte content.
    pub fn entries_from_rows(&self, rows: &RowSet) -> Result<OrderedEntrySet> {
        rows.rows.iter().map(|row| self.entry_from_row(row)).collect()
    }

    fn entry_from_row(&self, row: &Row) -> Result<InputEntry> {
        let columns = &self.config.columns;
        let sequence = row.require_integer(&columns.sequence)?;

        let content = match row.get(&columns.content) {
            None | Some(FieldValue::Null) => Vec::new(),
            Some(FieldValue::Bytes(bytes)) => bytes.clone(),
            Some(other) => {
                return Err(PdfBatchError::FieldType {
                    table: row.table(),
                    column: columns.content.clone(),
                    expected: "bytes",
                    found: other.kind(),
                });
            }
        };

        let name = match row.text(&columns.name) {
            Some(name) => name.to_string(),
            None => {
                self.observer.field_defaulted(&columns.name, "");
                String::new()
            }
        };

        Ok(InputEntry::new(name, sequence, content))
    }
}
