//! Minimal queries: one equality filter, one sort column, a row limit.

use crate::record::{FieldValue, Row, TableId};

static NULL: FieldValue = FieldValue::Null;

/// Sort direction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column to compare.
    pub column: String,
    /// Value the column must equal.
    pub value: FieldValue,
}

/// Sort specification.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// Column to sort by.
    pub column: String,
    /// Sort direction.
    pub direction: SortDirection,
}

/// A fetch request against one table.
///
/// # Examples
///
/// ```
/// use pdfbatch::record::{Query, SortDirection, TableId};
/// use uuid::Uuid;
///
/// let query = Query::select(TableId::generate())
///     .where_eq("ManagedBindingID", Uuid::nil())
///     .order_by("Seq nr", SortDirection::Ascending)
///     .limit(1000);
/// assert_eq!(query.limit, Some(1000));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Table to read.
    pub table: TableId,
    /// Optional equality filter.
    pub filter: Option<Filter>,
    /// Optional sort.
    pub sort: Option<Sort>,
    /// Maximum number of rows returned.
    pub limit: Option<usize>,
}

impl Query {
    /// Start a query that returns every row of a table in storage order.
    pub fn select(table: TableId) -> Self {
        Self {
            table,
            filter: None,
            sort: None,
            limit: None,
        }
    }

    /// Keep only rows whose column equals the value.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filter = Some(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Sort rows by a column. The sort is stable.
    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort {
            column: column.into(),
            direction,
        });
        self
    }

    /// Cap the number of rows returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if a row passes the filter.
    ///
    /// Id filters also accept cells holding the uuid as text.
    pub fn matches(&self, row: &Row) -> bool {
        match &self.filter {
            Some(filter) => row
                .get(&filter.column)
                .is_some_and(|value| value.matches(&filter.value)),
            None => true,
        }
    }

    /// Evaluate the query over rows held in storage order.
    ///
    /// Filtering happens first, then sorting, then the limit, so a limit
    /// always keeps the first rows of the sorted result.
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let mut selected: Vec<Row> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if let Some(sort) = &self.sort {
            selected.sort_by(|a, b| {
                let a = a.get(&sort.column).unwrap_or(&NULL);
                let b = b.get(&sort.column).unwrap_or(&NULL);
                match sort.direction {
                    SortDirection::Ascending => a.sort_cmp(b),
                    SortDirection::Descending => b.sort_cmp(a),
                }
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }
}
