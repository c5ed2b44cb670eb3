//! Rows, row sets and table identifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{PdfBatchError, Result};
use crate::record::FieldValue;

/// Identifier of a table in a record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(Uuid);

impl TableId {
    /// Generate a fresh random table id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing uuid.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The underlying uuid.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TableId {
    type Err = PdfBatchError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|err| PdfBatchError::invalid_config(format!("Invalid table id '{s}': {err}")))
    }
}

impl From<Uuid> for TableId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A single record: named, typed fields belonging to one table.
///
/// Lookups never fail. The plain accessors return `None` when the column is
/// absent, null, or of a different type; the `require_*` accessors turn that
/// into a [`PdfBatchError`] naming the column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table: TableId,
    fields: BTreeMap<String, FieldValue>,
}

impl Row {
    /// Create an empty row for a table.
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            fields: BTreeMap::new(),
        }
    }

    /// Create a row from existing fields.
    pub fn from_fields(table: TableId, fields: BTreeMap<String, FieldValue>) -> Self {
        Self { table, fields }
    }

    /// Create a new row shaped like the rows of a template set.
    ///
    /// Every column present on the template's first row is added as null.
    pub fn from_template(template: &RowSet) -> Self {
        let mut row = Self::new(template.table);
        if let Some(first) = template.rows.first() {
            for column in first.columns() {
                row.set(column, FieldValue::Null);
            }
        }
        row
    }

    /// Builder-style setter.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Table this row belongs to.
    pub fn table(&self) -> TableId {
        self.table
    }

    /// Column names in sorted order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Consume the row, returning its fields.
    pub fn into_fields(self) -> BTreeMap<String, FieldValue> {
        self.fields
    }

    /// Raw value of a column, if present.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// Text value of a column.
    pub fn text(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Integer value of a column.
    pub fn integer(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Byte value of a column.
    pub fn bytes(&self, column: &str) -> Option<&[u8]> {
        match self.get(column)? {
            FieldValue::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// Identifier value of a column. Text holding a uuid is accepted.
    pub fn id(&self, column: &str) -> Option<Uuid> {
        match self.get(column)? {
            FieldValue::Id(value) => Some(*value),
            FieldValue::Text(value) => Uuid::parse_str(value.trim()).ok(),
            _ => None,
        }
    }

    /// Integer value of a required column.
    pub fn require_integer(&self, column: &str) -> Result<i64> {
        self.require(column, "integer", |row| row.integer(column))
    }

    /// Identifier value of a required column.
    pub fn require_id(&self, column: &str) -> Result<Uuid> {
        self.require(column, "id", |row| row.id(column))
    }

    fn require<T>(
        &self,
        column: &str,
        expected: &'static str,
        extract: impl FnOnce(&Self) -> Option<T>,
    ) -> Result<T> {
        match self.get(column) {
            None | Some(FieldValue::Null) => Err(PdfBatchError::missing_field(self.table, column)),
            Some(value) => extract(self).ok_or_else(|| PdfBatchError::FieldType {
                table: self.table,
                column: column.to_string(),
                expected,
                found: value.kind(),
            }),
        }
    }
}

/// Ordered rows returned by a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    /// Table the rows were read from.
    pub table: TableId,
    /// Rows in the order the source produced them.
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Create a row set.
    pub fn new(table: TableId, rows: Vec<Row>) -> Self {
        Self { table, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the set has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
