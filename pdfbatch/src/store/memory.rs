//! In-process record store.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{PdfBatchError, Result};
use crate::record::{Query, RecordSink, RecordSource, Row, RowSet, TableId};

/// Tables held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<TableId, Vec<Row>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty table and return its id.
    pub fn create_table(&self) -> TableId {
        let table = TableId::generate();
        self.add_table(table);
        table
    }

    /// Register an empty table under a known id. Existing rows are kept.
    pub fn add_table(&self, table: TableId) {
        self.tables.write().entry(table).or_default();
    }

    /// Append a row to its table.
    pub fn insert_row(&self, row: Row) -> Result<()> {
        let table = row.table();
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(&table)
            .ok_or_else(|| PdfBatchError::unknown_table(table))?;
        rows.push(row);
        Ok(())
    }

    /// All rows of a table in insertion order.
    pub fn rows(&self, table: TableId) -> Result<Vec<Row>> {
        self.tables
            .read()
            .get(&table)
            .cloned()
            .ok_or_else(|| PdfBatchError::unknown_table(table))
    }

    fn select(&self, query: &Query) -> Result<RowSet> {
        let tables = self.tables.read();
        let rows = tables
            .get(&query.table)
            .ok_or_else(|| PdfBatchError::unknown_table(query.table))?;

        Ok(RowSet::new(query.table, query.apply(rows.iter().cloned())))
    }
}

impl RecordSource for MemoryStore {
    async fn fetch(&self, query: &Query) -> Result<RowSet> {
        self.select(query)
    }
}

impl RecordSink for MemoryStore {
    async fn create_row(&self, template: &RowSet) -> Result<Row> {
        if !self.tables.read().contains_key(&template.table) {
            return Err(PdfBatchError::unknown_table(template.table));
        }
        Ok(Row::from_template(template))
    }

    async fn insert(&self, row: Row) -> Result<()> {
        self.insert_row(row)
    }
}
