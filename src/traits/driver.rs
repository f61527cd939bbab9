use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RawQueryResult, SqlValue};

/// A conventional SQL client: one set of bind values per execution.
///
/// Drivers are responsible for:
/// - Connecting to the database
/// - Converting SqlValue parameters to native types
/// - Executing statements and converting results to RawQueryResult
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Execute a statement, returning the number of rows affected.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Execute a query and buffer its result.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult>;

    async fn prepare(&self, sql: &str) -> Result<Box<dyn DriverStatement>>;

    async fn begin(&self) -> Result<Box<dyn DriverTransaction>>;

    /// Release the underlying connection.
    async fn close(&self) -> Result<()>;
}

/// An open transaction on a [`DatabaseDriver`].
#[async_trait]
pub trait DriverTransaction: Send {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult>;

    async fn prepare(&mut self, sql: &str) -> Result<Box<dyn DriverStatement>>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// A prepared statement.
#[async_trait]
pub trait DriverStatement: Send + Sync {
    fn sql(&self) -> &str;

    async fn execute(&self, params: &[SqlValue]) -> Result<u64>;

    async fn query(&self, params: &[SqlValue]) -> Result<RawQueryResult>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// An enhanced client that can also bind an array of rows to one statement
/// and send them in a single round trip.
#[async_trait]
pub trait ArrayBindDriver: DatabaseDriver {
    /// Execute `sql` once per row in `rows`, in one call.
    async fn execute_batch(&self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<u64>;

    async fn prepare_batch(&self, sql: &str) -> Result<Box<dyn BatchStatement>>;

    async fn begin_batch(&self) -> Result<Box<dyn BatchTransaction>>;
}

/// A transaction on an [`ArrayBindDriver`].
#[async_trait]
pub trait BatchTransaction: DriverTransaction {
    async fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<u64>;

    async fn prepare_batch(&mut self, sql: &str) -> Result<Box<dyn BatchStatement>>;
}

/// A prepared statement on an [`ArrayBindDriver`].
#[async_trait]
pub trait BatchStatement: DriverStatement {
    async fn execute_batch(&self, rows: &[Vec<SqlValue>]) -> Result<u64>;
}
