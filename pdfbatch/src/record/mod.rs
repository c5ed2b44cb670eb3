//! Record model and the source/sink traits over a tabular store.
//!
//! String-keyed field access lives here and nowhere else: the orchestrator
//! maps [`Row`]s into typed entries before anything reaches the merge
//! engine.

pub mod query;
pub mod row;
pub mod value;

pub use query::{Filter, Query, Sort, SortDirection};
pub use row::{Row, RowSet, TableId};
pub use value::FieldValue;

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;

/// Read side of a record store.
pub trait RecordSource: Send + Sync {
    /// Fetch the rows selected by a query, in query order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PdfBatchError::UnknownTable`] if the table does not
    /// exist, or a store-specific error if reading fails.
    fn fetch(&self, query: &Query) -> impl Future<Output = Result<RowSet>> + Send;
}

/// Write side of a record store.
pub trait RecordSink: Send + Sync {
    /// Create a new, not yet inserted row shaped like the template's table.
    fn create_row(&self, template: &RowSet) -> impl Future<Output = Result<Row>> + Send;

    /// Insert a row into its table.
    fn insert(&self, row: Row) -> impl Future<Output = Result<()>> + Send;
}

impl<T: RecordSource> RecordSource for Arc<T> {
    fn fetch(&self, query: &Query) -> impl Future<Output = Result<RowSet>> + Send {
        (**self).fetch(query)
    }
}

impl<T: RecordSink> RecordSink for Arc<T> {
    fn create_row(&self, template: &RowSet) -> impl Future<Output = Result<Row>> + Send {
        (**self).create_row(template)
    }

    fn insert(&self, row: Row) -> impl Future<Output = Result<()>> + Send {
        (**self).insert(row)
    }
}
