use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::context::Context;
use crate::dml::DmlGenerator;
use crate::error::{Result, SyncError};
use crate::traits::{
    ArrayBindDriver, BatchStatement, BatchTransaction, DatabaseDriver, DriverStatement,
    DriverTransaction,
};
use crate::types::{Dialect, Rows, SqlValue};

/// Which kind of client backs a [`Connector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Standard,
    ArrayBind,
}

/// The one client a connector talks through.
#[derive(Clone)]
pub enum Client {
    Standard(Arc<dyn DatabaseDriver>),
    ArrayBind(Arc<dyn ArrayBindDriver>),
}

impl Client {
    pub fn kind(&self) -> ClientKind {
        match self {
            Client::Standard(_) => ClientKind::Standard,
            Client::ArrayBind(_) => ClientKind::ArrayBind,
        }
    }
}

fn unsupported_batch(what: &str) -> SyncError {
    SyncError::UnsupportedOperation(format!(
        "{} requires an array-bind client; this connection uses a standard client",
        what
    ))
}

/// A database connection for one dialect.
///
/// Holds a connection and hands out statement generators whose bind syntax
/// matches it.
///
/// # Example
/// ```ignore
/// let connector = registry.open(&details).await?;
/// let mut insert = connector
///     .dml_generator()
///     .new_insert_generator(&cfg)?;
/// insert.init_batch(500);
/// // ... add rows ...
/// connector.exec(&insert.statement(), insert.values()).await?;
/// ```
pub struct Connector {
    dialect: Dialect,
    client: Client,
    generator: DmlGenerator,
    tx_open: Arc<AtomicBool>,
}

impl Connector {
    pub fn new(dialect: Dialect, client: Client) -> Self {
        Self {
            dialect,
            generator: DmlGenerator::for_dialect(dialect),
            client,
            tx_open: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override the generator handed out by [`dml_generator`](Self::dml_generator).
    pub fn with_dml_generator(mut self, generator: DmlGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Dialect tag, e.g. `"oracle"`.
    pub fn get_type(&self) -> &'static str {
        self.dialect.as_str()
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn client_kind(&self) -> ClientKind {
        self.client.kind()
    }

    pub fn dml_generator(&self) -> DmlGenerator {
        self.generator
    }

    pub async fn begin(&self) -> Result<Transacter> {
        self.begin_context(&Context::background()).await
    }

    /// Whether a [`Transacter`] from this connector is still open.
    pub fn in_transaction(&self) -> bool {
        self.tx_open.load(Ordering::SeqCst)
    }

    /// Start a transaction.
    ///
    /// A connection holds at most one open transaction; a second `begin`
    /// before the first is committed or rolled back fails with
    /// [`SyncError::TransactionInProgress`].
    pub async fn begin_context(&self, ctx: &Context) -> Result<Transacter> {
        if self
            .tx_open
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::TransactionInProgress);
        }
        let res = match &self.client {
            Client::Standard(d) => ctx.run(d.begin()).await.map(TxHandle::Standard),
            Client::ArrayBind(d) => ctx.run(d.begin_batch()).await.map(TxHandle::ArrayBind),
        };
        let handle = match res {
            Ok(handle) => handle,
            Err(e) => {
                self.tx_open.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        debug!(dialect = %self.dialect, "transaction started");
        Ok(Transacter {
            dialect: self.dialect,
            handle: Some(handle),
            open: Arc::clone(&self.tx_open),
        })
    }

    pub async fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.exec_context(&Context::background(), sql, params).await
    }

    pub async fn exec_context(&self, ctx: &Context, sql: &str, params: &[SqlValue]) -> Result<u64> {
        debug!(dialect = %self.dialect, params = params.len(), "exec: {}", sql);
        match &self.client {
            Client::Standard(d) => ctx.run(d.execute(sql, params)).await,
            Client::ArrayBind(d) => ctx.run(d.execute(sql, params)).await,
        }
    }

    pub async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Rows> {
        self.query_context(&Context::background(), sql, params).await
    }

    pub async fn query_context(
        &self,
        ctx: &Context,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Rows> {
        debug!(dialect = %self.dialect, params = params.len(), "query: {}", sql);
        let raw = match &self.client {
            Client::Standard(d) => ctx.run(d.query(sql, params)).await?,
            Client::ArrayBind(d) => ctx.run(d.query(sql, params)).await?,
        };
        Ok(Rows::from_raw(raw))
    }

    /// Execute `sql` for every row in `rows` in a single array-bind call.
    pub async fn exec_batch(&self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<u64> {
        self.exec_batch_context(&Context::background(), sql, rows)
            .await
    }

    pub async fn exec_batch_context(
        &self,
        ctx: &Context,
        sql: &str,
        rows: &[Vec<SqlValue>],
    ) -> Result<u64> {
        match &self.client {
            Client::Standard(_) => Err(unsupported_batch("exec_batch")),
            Client::ArrayBind(d) => {
                debug!(dialect = %self.dialect, rows = rows.len(), "exec batch: {}", sql);
                ctx.run(d.execute_batch(sql, rows)).await
            }
        }
    }

    pub async fn prepare(&self, sql: &str) -> Result<Statement> {
        self.prepare_context(&Context::background(), sql).await
    }

    pub async fn prepare_context(&self, ctx: &Context, sql: &str) -> Result<Statement> {
        let handle = match &self.client {
            Client::Standard(d) => StmtHandle::Standard(ctx.run(d.prepare(sql)).await?),
            Client::ArrayBind(d) => StmtHandle::ArrayBind(ctx.run(d.prepare_batch(sql)).await?),
        };
        Ok(Statement::new(handle))
    }

    pub async fn close(&self) -> Result<()> {
        info!(dialect = %self.dialect, "closing connection");
        match &self.client {
            Client::Standard(d) => d.close().await,
            Client::ArrayBind(d) => d.close().await,
        }
    }
}

enum TxHandle {
    Standard(Box<dyn DriverTransaction>),
    ArrayBind(Box<dyn BatchTransaction>),
}

/// An open transaction.
///
/// `Open -> (exec/query/prepare)* -> commit | rollback -> Closed`. Every call
/// after the transaction is closed fails with
/// [`SyncError::TransactionClosed`]. A failed commit also closes it; it is
/// never retried here.
///
/// Dropping an open transaction rolls it back on the current tokio runtime.
/// The connector accepts a new `begin` once that rollback has finished.
pub struct Transacter {
    dialect: Dialect,
    handle: Option<TxHandle>,
    open: Arc<AtomicBool>,
}

impl Transacter {
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn open_handle(&mut self) -> Result<&mut TxHandle> {
        self.handle.as_mut().ok_or(SyncError::TransactionClosed)
    }

    pub async fn exec(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.exec_context(&Context::background(), sql, params).await
    }

    pub async fn exec_context(
        &mut self,
        ctx: &Context,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<u64> {
        debug!(dialect = %self.dialect, params = params.len(), "tx exec: {}", sql);
        match self.open_handle()? {
            TxHandle::Standard(tx) => ctx.run(tx.execute(sql, params)).await,
            TxHandle::ArrayBind(tx) => ctx.run(tx.execute(sql, params)).await,
        }
    }

    pub async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Rows> {
        self.query_context(&Context::background(), sql, params).await
    }

    pub async fn query_context(
        &mut self,
        ctx: &Context,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Rows> {
        debug!(dialect = %self.dialect, params = params.len(), "tx query: {}", sql);
        let raw = match self.open_handle()? {
            TxHandle::Standard(tx) => ctx.run(tx.query(sql, params)).await?,
            TxHandle::ArrayBind(tx) => ctx.run(tx.query(sql, params)).await?,
        };
        Ok(Rows::from_raw(raw))
    }

    pub async fn exec_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<u64> {
        self.exec_batch_context(&Context::background(), sql, rows)
            .await
    }

    pub async fn exec_batch_context(
        &mut self,
        ctx: &Context,
        sql: &str,
        rows: &[Vec<SqlValue>],
    ) -> Result<u64> {
        match self.open_handle()? {
            TxHandle::Standard(_) => Err(unsupported_batch("exec_batch")),
            TxHandle::ArrayBind(tx) => {
                debug!(rows = rows.len(), "tx exec batch: {}", sql);
                ctx.run(tx.execute_batch(sql, rows)).await
            }
        }
    }

    pub async fn prepare(&mut self, sql: &str) -> Result<Statement> {
        self.prepare_context(&Context::background(), sql).await
    }

    pub async fn prepare_context(&mut self, ctx: &Context, sql: &str) -> Result<Statement> {
        let handle = match self.open_handle()? {
            TxHandle::Standard(tx) => StmtHandle::Standard(ctx.run(tx.prepare(sql)).await?),
            TxHandle::ArrayBind(tx) => {
                StmtHandle::ArrayBind(ctx.run(tx.prepare_batch(sql)).await?)
            }
        };
        Ok(Statement::new(handle))
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.commit_context(&Context::background()).await
    }

    pub async fn commit_context(&mut self, ctx: &Context) -> Result<()> {
        let handle = self.handle.take().ok_or(SyncError::TransactionClosed)?;
        let res = match handle {
            TxHandle::Standard(tx) => ctx.run(tx.commit()).await,
            TxHandle::ArrayBind(tx) => ctx.run(tx.commit()).await,
        };
        self.open.store(false, Ordering::SeqCst);
        match &res {
            Ok(()) => debug!(dialect = %self.dialect, "transaction committed"),
            Err(e) => warn!(dialect = %self.dialect, "commit failed: {}", e),
        }
        res
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.rollback_context(&Context::background()).await
    }

    pub async fn rollback_context(&mut self, ctx: &Context) -> Result<()> {
        let handle = self.handle.take().ok_or(SyncError::TransactionClosed)?;
        debug!(dialect = %self.dialect, "rolling back transaction");
        let res = match handle {
            TxHandle::Standard(tx) => ctx.run(tx.rollback()).await,
            TxHandle::ArrayBind(tx) => ctx.run(tx.rollback()).await,
        };
        self.open.store(false, Ordering::SeqCst);
        res
    }
}

impl TxHandle {
    async fn rollback(self) -> Result<()> {
        match self {
            TxHandle::Standard(tx) => tx.rollback().await,
            TxHandle::ArrayBind(tx) => tx.rollback().await,
        }
    }
}

impl Drop for Transacter {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        warn!(
            dialect = %self.dialect,
            "transaction dropped without commit or rollback; rolling back"
        );
        let open = Arc::clone(&self.open);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let dialect = self.dialect;
                runtime.spawn(async move {
                    if let Err(e) = handle.rollback().await {
                        warn!(dialect = %dialect, "rollback of dropped transaction failed: {}", e);
                    }
                    open.store(false, Ordering::SeqCst);
                });
            }
            Err(_) => {
                warn!(dialect = %self.dialect, "no runtime to roll back dropped transaction");
                open.store(false, Ordering::SeqCst);
            }
        }
    }
}

enum StmtHandle {
    Standard(Box<dyn DriverStatement>),
    ArrayBind(Box<dyn BatchStatement>),
}

/// A prepared statement obtained from a [`Connector`] or [`Transacter`].
pub struct Statement {
    handle: StmtHandle,
    closed: bool,
}

impl Statement {
    fn new(handle: StmtHandle) -> Self {
        Self {
            handle,
            closed: false,
        }
    }

    pub fn sql(&self) -> &str {
        match &self.handle {
            StmtHandle::Standard(s) => s.sql(),
            StmtHandle::ArrayBind(s) => s.sql(),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(SyncError::StatementClosed(self.sql().to_string()));
        }
        Ok(())
    }

    pub async fn exec(&self, params: &[SqlValue]) -> Result<u64> {
        self.exec_context(&Context::background(), params).await
    }

    pub async fn exec_context(&self, ctx: &Context, params: &[SqlValue]) -> Result<u64> {
        self.ensure_open()?;
        match &self.handle {
            StmtHandle::Standard(s) => ctx.run(s.execute(params)).await,
            StmtHandle::ArrayBind(s) => ctx.run(s.execute(params)).await,
        }
    }

    pub async fn query(&self, params: &[SqlValue]) -> Result<Rows> {
        self.query_context(&Context::background(), params).await
    }

    pub async fn query_context(&self, ctx: &Context, params: &[SqlValue]) -> Result<Rows> {
        self.ensure_open()?;
        let raw = match &self.handle {
            StmtHandle::Standard(s) => ctx.run(s.query(params)).await?,
            StmtHandle::ArrayBind(s) => ctx.run(s.query(params)).await?,
        };
        Ok(Rows::from_raw(raw))
    }

    /// Bind every row in `rows` and execute them in one call.
    pub async fn exec_batch(&self, rows: &[Vec<SqlValue>]) -> Result<u64> {
        self.exec_batch_context(&Context::background(), rows).await
    }

    pub async fn exec_batch_context(&self, ctx: &Context, rows: &[Vec<SqlValue>]) -> Result<u64> {
        self.ensure_open()?;
        match &self.handle {
            StmtHandle::Standard(_) => Err(unsupported_batch("Statement::exec_batch")),
            StmtHandle::ArrayBind(s) => ctx.run(s.execute_batch(rows)).await,
        }
    }

    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match &self.handle {
            StmtHandle::Standard(s) => s.close().await,
            StmtHandle::ArrayBind(s) => s.close().await,
        }
    }
}
