use crate::error::{Result, SyncError};
use crate::types::SqlValue;

/// Metadata describing one column of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnType {
    pub name: String,
    /// Database-specific type name, e.g. `VARCHAR2` or `int8`.
    pub database_type_name: String,
    /// `None` when the driver cannot tell.
    pub nullable: Option<bool>,
}

impl ColumnType {
    pub fn new(name: impl Into<String>, database_type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database_type_name: database_type_name.into(),
            nullable: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }
}

/// Driver-agnostic raw result from a database query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQueryResult {
    /// Column metadata in order
    pub columns: Vec<ColumnType>,
    /// Rows, where each row holds values in column order
    pub rows: Vec<Vec<SqlValue>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<ColumnType>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Forward-only cursor over a query result.
///
/// `Open -> (next/scan)* -> Closed`. Scanning after [`Rows::close`] fails with
/// [`SyncError::RowsClosed`].
#[derive(Debug)]
pub struct Rows {
    columns: Vec<ColumnType>,
    remaining: std::vec::IntoIter<Vec<SqlValue>>,
    current: Option<Vec<SqlValue>>,
    closed: bool,
}

impl Rows {
    pub fn from_raw(raw: RawQueryResult) -> Self {
        Self {
            columns: raw.columns,
            remaining: raw.rows.into_iter(),
            current: None,
            closed: false,
        }
    }

    /// Advance to the next row. Returns false once the result is exhausted.
    pub fn next(&mut self) -> Result<bool> {
        if self.closed {
            return Err(SyncError::RowsClosed);
        }
        self.current = self.remaining.next();
        Ok(self.current.is_some())
    }

    /// Values of the current row, in column order.
    pub fn scan(&self) -> Result<&[SqlValue]> {
        if self.closed {
            return Err(SyncError::RowsClosed);
        }
        self.current.as_deref().ok_or(SyncError::NoCurrentRow)
    }

    /// Value of a named column in the current row.
    pub fn get(&self, column: &str) -> Result<&SqlValue> {
        let values = self.scan()?;
        self.columns
            .iter()
            .position(|c| c.name == column)
            .and_then(|i| values.get(i))
            .ok_or_else(|| SyncError::ColumnNotFound(column.to_string()))
    }

    pub fn column_types(&self) -> &[ColumnType] {
        &self.columns
    }

    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Release the cursor. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
        self.current = None;
        self.remaining = Vec::new().into_iter();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Consume the cursor, expecting exactly one row.
    pub fn single_row(mut self) -> Result<Vec<SqlValue>> {
        if self.closed {
            return Err(SyncError::RowsClosed);
        }
        let first = self.remaining.next();
        let extra = self.remaining.len();
        self.close();
        match first {
            Some(row) if extra == 0 => Ok(row),
            Some(_) => Err(SyncError::UnexpectedRowCount {
                expected: 1,
                actual: extra + 1,
            }),
            None => Err(SyncError::UnexpectedRowCount {
                expected: 1,
                actual: 0,
            }),
        }
    }
}
