//! Record store backed by a directory of JSON files.
//!
//! Each table is one `<table-id>.json` file under the store root:
//!
//! ```json
//! {
//!   "rows": [
//!     { "Seq nr": { "type": "integer", "value": 1 },
//!       "PDF Content": { "type": "bytes", "value": "JVBERi0x..." } }
//!   ]
//! }
//! ```
//!
//! Writes go through a temp file and a rename, so a crash never leaves a
//! half-written table behind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::error::{PdfBatchError, Result};
use crate::record::{FieldValue, Query, RecordSink, RecordSource, Row, RowSet, TableId};
use crate::utils::write_atomic;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TableFile {
    rows: Vec<BTreeMap<String, FieldValue>>,
}

/// Tables stored as JSON files in a directory.
#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    // Serializes read-modify-write cycles on table files.
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of a table's file.
    pub fn table_path(&self, table: TableId) -> PathBuf {
        self.root.join(format!("{table}.json"))
    }

    /// Create a new empty table and return its id.
    pub async fn create_table(&self) -> Result<TableId> {
        let table = TableId::generate();
        self.add_table(table).await?;
        Ok(table)
    }

    /// Create an empty table under a known id. Existing tables are kept.
    pub async fn add_table(&self, table: TableId) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if tokio::fs::try_exists(self.table_path(table)).await? {
            return Ok(());
        }
        self.write_table(table, TableFile::default()).await
    }

    /// Append a row to its table.
    pub async fn insert_row(&self, row: Row) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let table = row.table();
        let mut file = self.read_table(table).await?;
        file.rows.push(row.into_fields());
        self.write_table(table, file).await
    }

    /// All rows of a table in insertion order.
    pub async fn rows(&self, table: TableId) -> Result<Vec<Row>> {
        let file = self.read_table(table).await?;
        Ok(file
            .rows
            .into_iter()
            .map(|fields| Row::from_fields(table, fields))
            .collect())
    }

    async fn read_table(&self, table: TableId) -> Result<TableFile> {
        let path = self.table_path(table);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(PdfBatchError::unknown_table(table));
            }
            Err(err) => {
                return Err(PdfBatchError::source_failed(format!(
                    "{}: {err}",
                    path.display()
                )));
            }
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_table(&self, table: TableId, file: TableFile) -> Result<()> {
        let path = self.table_path(table);
        let bytes = serde_json::to_vec_pretty(&file)?;

        write_atomic(&path, &bytes)
            .await
            .map_err(|err| PdfBatchError::sink_failed(format!("{}: {err}", path.display())))
    }
}

impl RecordSource for JsonStore {
    async fn fetch(&self, query: &Query) -> Result<RowSet> {
        let rows = self.rows(query.table).await?;
        Ok(RowSet::new(query.table, query.apply(rows)))
    }
}

impl RecordSink for JsonStore {
    async fn create_row(&self, template: &RowSet) -> Result<Row> {
        if !tokio::fs::try_exists(self.table_path(template.table)).await? {
            return Err(PdfBatchError::unknown_table(template.table));
        }
        Ok(Row::from_template(template))
    }

    async fn insert(&self, row: Row) -> Result<()> {
        self.insert_row(row).await
    }
}
