//! pdfbatch - Merge ordered batches of stored PDF records into one document.
//!
//! A batch is a set of rows in an input table that share a binding id. Each
//! row holds a sequence number, a display name and the bytes of a PDF. The
//! batch is fetched in sequence order, the pages of every PDF are
//! concatenated, and the merged document is written back as a single row of
//! an output table tagged with the same binding id.
//!
//! - [`merge::MergeEngine`] performs the page-level merge.
//! - [`record::RecordSource`] and [`record::RecordSink`] abstract the table
//!   store; [`store`] ships in-memory and JSON-directory implementations.
//! - [`orchestrator::Orchestrator`] drives one batch end to end.
//! - [`observer::BatchObserver`] receives warnings and outcomes.
//!
//! # Examples
//!
//! ## Merge entries directly
//!
//! ```no_run
//! use pdfbatch::merge::{InputEntry, MergeEngine, OrderedEntrySet};
//! use pdfbatch::observer::TracingObserver;
//! use std::sync::Arc;
//!
//! # fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = MergeEngine::new(Arc::new(TracingObserver));
//! let entries: OrderedEntrySet = vec![
//!     InputEntry::new("a.pdf", 1, a),
//!     InputEntry::new("b.pdf", 2, b),
//! ]
//! .into_iter()
//! .collect();
//!
//! let outcome = engine.merge(entries)?;
//! println!("Merged {} pages", outcome.statistics.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Run a batch against a store
//!
//! ```no_run
//! use pdfbatch::config::Config;
//! use pdfbatch::observer::TracingObserver;
//! use pdfbatch::orchestrator::Orchestrator;
//! use pdfbatch::record::TableId;
//! use pdfbatch::store::JsonStore;
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # async fn example(input: TableId, output: TableId, binding: Uuid) -> pdfbatch::Result<()> {
//! let store = Arc::new(JsonStore::open("tables").await?);
//! let config = Config::new(input, output, binding);
//! let orchestrator = Orchestrator::new(config, store.clone(), store, Arc::new(TracingObserver));
//! let report = orchestrator.run().await?;
//! println!("{} rows merged into {}", report.rows_received, report.document.filename);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod observer;
pub mod orchestrator;
pub mod record;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{MergeCause, PdfBatchError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
