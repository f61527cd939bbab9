use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Result, SyncError};
use crate::traits::{
    ArrayBindDriver, BatchStatement, BatchTransaction, DatabaseDriver, DriverStatement,
    DriverTransaction,
};
use crate::types::{format_args_list, ColumnType, RawQueryResult, SqlValue};

/// A recorded statement execution for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    /// Bind values; batch executions are flattened row by row.
    pub params: Vec<SqlValue>,
}

struct MockState {
    queue: mpsc::Sender<String>,
    responses: Mutex<VecDeque<RawQueryResult>>,
    default_response: Mutex<RawQueryResult>,
    recorded_queries: Mutex<Vec<RecordedQuery>>,
    fail_next: Mutex<Option<String>>,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    closed: AtomicBool,
}

impl MockState {
    fn take_failure(&self) -> Result<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(message) => Err(SyncError::QueryFailed(message)),
            None => Ok(()),
        }
    }

    async fn send(&self, message: String) -> Result<()> {
        self.queue
            .send(message)
            .await
            .map_err(|_| SyncError::QueryFailed("mock message queue is closed".to_string()))
    }

    /// Push the SQL text and the stringified arguments onto the queue.
    async fn record(&self, sql: &str, params: &[SqlValue]) -> Result<()> {
        self.take_failure()?;
        self.recorded_queries.lock().unwrap().push(RecordedQuery {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.send(sql.to_string()).await?;
        self.send(format_args_list(params)).await
    }

    /// Push the SQL text and a `num cols = X; num rows = Y` summary.
    async fn record_batch(&self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<u64> {
        self.take_failure()?;
        self.recorded_queries.lock().unwrap().push(RecordedQuery {
            sql: sql.to_string(),
            params: rows.iter().flatten().cloned().collect(),
        });
        let cols = rows.first().map_or(0, |r| r.len());
        self.send(sql.to_string()).await?;
        self.send(format!("num cols = {}; num rows = {}", cols, rows.len()))
            .await?;
        Ok(rows.len() as u64)
    }

    fn next_response(&self) -> RawQueryResult {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.lock().unwrap().clone())
    }
}

/// A driver that records statements instead of running them.
///
/// Every execution writes the SQL text followed by its stringified argument
/// list (`[x y 123]`) onto a bounded channel. Batch executions write the SQL
/// text followed by `num cols = X; num rows = Y`. Sends wait while the
/// channel is full.
///
/// Implements both the standard and the array-bind driver contracts, so it
/// can back a [`Connector`](crate::Connector) of either client kind.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
/// use tablesync::drivers::{MockDriver, MockResponseBuilder};
/// use tablesync::{Client, Connector, Dialect};
///
/// let (tx, _rx) = mpsc::channel(16);
/// let driver = Arc::new(MockDriver::new(tx).with_response(
///     MockResponseBuilder::new()
///         .columns(&["id", "name"])
///         .row(vec![1.into(), "Alice".into()])
///         .build(),
/// ));
/// let connector = Connector::new(Dialect::Oracle, Client::ArrayBind(driver));
/// assert_eq!(connector.get_type(), "oracle");
/// ```
#[derive(Clone)]
pub struct MockDriver {
    state: Arc<MockState>,
}

impl MockDriver {
    pub fn new(queue: mpsc::Sender<String>) -> Self {
        Self {
            state: Arc::new(MockState {
                queue,
                responses: Mutex::new(VecDeque::new()),
                default_response: Mutex::new(RawQueryResult::empty()),
                recorded_queries: Mutex::new(Vec::new()),
                fail_next: Mutex::new(None),
                commits: AtomicUsize::new(0),
                rollbacks: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Add a response to be returned by the next query.
    /// Responses are returned in FIFO order.
    pub fn with_response(self, response: RawQueryResult) -> Self {
        self.state.responses.lock().unwrap().push_back(response);
        self
    }

    /// Set a default response to use when no queued responses remain.
    pub fn with_default_response(self, response: RawQueryResult) -> Self {
        *self.state.default_response.lock().unwrap() = response;
        self
    }

    /// Make the next operation (execute, query, commit, ...) fail.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.state.fail_next.lock().unwrap() = Some(message.into());
    }

    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.state.recorded_queries.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<RecordedQuery> {
        self.state.recorded_queries.lock().unwrap().last().cloned()
    }

    pub fn clear_recorded_queries(&self) {
        self.state.recorded_queries.lock().unwrap().clear();
    }

    pub fn commits(&self) -> usize {
        self.state.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.state.rollbacks.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Assert that the last query matches the expected SQL and parameters.
    pub fn assert_last_query(&self, expected_sql: &str, expected_params: &[SqlValue]) {
        let last = self.last_query().expect("No queries were recorded");
        assert_eq!(
            last.sql, expected_sql,
            "SQL mismatch.\nExpected: {}\nActual: {}",
            expected_sql, last.sql
        );
        assert_eq!(
            last.params, expected_params,
            "Parameters mismatch.\nExpected: {:?}\nActual: {:?}",
            expected_params, last.params
        );
    }

    /// Assert that exactly n statements were executed.
    pub fn assert_query_count(&self, expected: usize) {
        let actual = self.state.recorded_queries.lock().unwrap().len();
        assert_eq!(
            actual, expected,
            "Query count mismatch. Expected: {}, Actual: {}",
            expected, actual
        );
    }

    fn statement(&self, sql: &str) -> MockStatement {
        MockStatement {
            state: Arc::clone(&self.state),
            sql: sql.to_string(),
        }
    }

    fn transaction(&self) -> Result<MockTransaction> {
        self.state.take_failure()?;
        Ok(MockTransaction {
            state: Arc::clone(&self.state),
        })
    }
}

#[async_trait]
impl DatabaseDriver for MockDriver {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.state.record(sql, params).await?;
        Ok(0)
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        self.state.record(sql, params).await?;
        Ok(self.state.next_response())
    }

    async fn prepare(&self, sql: &str) -> Result<Box<dyn DriverStatement>> {
        Ok(Box::new(self.statement(sql)))
    }

    async fn begin(&self) -> Result<Box<dyn DriverTransaction>> {
        Ok(Box::new(self.transaction()?))
    }

    async fn close(&self) -> Result<()> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ArrayBindDriver for MockDriver {
    async fn execute_batch(&self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<u64> {
        self.state.record_batch(sql, rows).await
    }

    async fn prepare_batch(&self, sql: &str) -> Result<Box<dyn BatchStatement>> {
        Ok(Box::new(self.statement(sql)))
    }

    async fn begin_batch(&self) -> Result<Box<dyn BatchTransaction>> {
        Ok(Box::new(self.transaction()?))
    }
}

struct MockTransaction {
    state: Arc<MockState>,
}

#[async_trait]
impl DriverTransaction for MockTransaction {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.state.record(sql, params).await?;
        Ok(0)
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        self.state.record(sql, params).await?;
        Ok(self.state.next_response())
    }

    async fn prepare(&mut self, sql: &str) -> Result<Box<dyn DriverStatement>> {
        Ok(Box::new(MockStatement {
            state: Arc::clone(&self.state),
            sql: sql.to_string(),
        }))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.state.take_failure()?;
        self.state.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.state.take_failure()?;
        self.state.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BatchTransaction for MockTransaction {
    async fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<u64> {
        self.state.record_batch(sql, rows).await
    }

    async fn prepare_batch(&mut self, sql: &str) -> Result<Box<dyn BatchStatement>> {
        Ok(Box::new(MockStatement {
            state: Arc::clone(&self.state),
            sql: sql.to_string(),
        }))
    }
}

struct MockStatement {
    state: Arc<MockState>,
    sql: String,
}

#[async_trait]
impl DriverStatement for MockStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    async fn execute(&self, params: &[SqlValue]) -> Result<u64> {
        self.state.record(&self.sql, params).await?;
        Ok(0)
    }

    async fn query(&self, params: &[SqlValue]) -> Result<RawQueryResult> {
        self.state.record(&self.sql, params).await?;
        Ok(self.state.next_response())
    }
}

#[async_trait]
impl BatchStatement for MockStatement {
    async fn execute_batch(&self, rows: &[Vec<SqlValue>]) -> Result<u64> {
        self.state.record_batch(&self.sql, rows).await
    }
}

/// Builder for creating mock query responses.
pub struct MockResponseBuilder {
    columns: Vec<ColumnType>,
    rows: Vec<Vec<SqlValue>>,
}

impl MockResponseBuilder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Set the column names for the response. Types are reported as `text`.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|c| ColumnType::new(*c, "text")).collect();
        self
    }

    /// Add a row of values.
    pub fn row(mut self, values: Vec<SqlValue>) -> Self {
        self.rows.push(values);
        self
    }

    pub fn build(self) -> RawQueryResult {
        RawQueryResult::new(self.columns, self.rows)
    }
}

impl Default for MockResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
