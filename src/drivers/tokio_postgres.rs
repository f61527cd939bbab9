use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use crate::error::{Result, SyncError};
use crate::traits::{DatabaseDriver, DriverStatement, DriverTransaction};
use crate::types::{ColumnType, RawQueryResult, SqlValue};

/// PostgreSQL driver implementation using tokio-postgres.
///
/// tokio-postgres binds one parameter set per execution, so this is a
/// standard (non array-bind) client.
pub struct TokioPostgresDriver {
    client: Arc<Client>,
    connection_task: JoinHandle<()>,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| SyncError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        let connection_task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(Self {
            client: Arc::new(client),
            connection_task,
        })
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        execute(&self.client, sql, params).await
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        query(&self.client, sql, params).await
    }

    async fn prepare(&self, sql: &str) -> Result<Box<dyn DriverStatement>> {
        prepare(&self.client, sql).await
    }

    async fn begin(&self) -> Result<Box<dyn DriverTransaction>> {
        self.client
            .batch_execute("BEGIN")
            .await
            .map_err(|e| SyncError::query_failed("begin", e))?;
        Ok(Box::new(PgTransaction {
            client: Arc::clone(&self.client),
        }))
    }

    async fn close(&self) -> Result<()> {
        debug!("closing PostgreSQL connection");
        self.connection_task.abort();
        Ok(())
    }
}

/// A transaction driven with explicit BEGIN/COMMIT/ROLLBACK on the shared
/// client, so it does not borrow the driver.
struct PgTransaction {
    client: Arc<Client>,
}

#[async_trait]
impl DriverTransaction for PgTransaction {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        execute(&self.client, sql, params).await
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        query(&self.client, sql, params).await
    }

    async fn prepare(&mut self, sql: &str) -> Result<Box<dyn DriverStatement>> {
        prepare(&self.client, sql).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.client
            .batch_execute("COMMIT")
            .await
            .map_err(|e| SyncError::query_failed("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.client
            .batch_execute("ROLLBACK")
            .await
            .map_err(|e| SyncError::query_failed("rollback", e))
    }
}

struct PgStatement {
    client: Arc<Client>,
    statement: tokio_postgres::Statement,
    sql: String,
}

#[async_trait]
impl DriverStatement for PgStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    async fn execute(&self, params: &[SqlValue]) -> Result<u64> {
        let converted = to_sql_params(params);
        self.client
            .execute(&self.statement, &param_refs(&converted))
            .await
            .map_err(|e| SyncError::query_failed(&self.sql, e))
    }

    async fn query(&self, params: &[SqlValue]) -> Result<RawQueryResult> {
        let converted = to_sql_params(params);
        let rows = self
            .client
            .query(&self.statement, &param_refs(&converted))
            .await
            .map_err(|e| SyncError::query_failed(&self.sql, e))?;
        convert_rows(&rows)
    }
}

async fn execute(client: &Client, sql: &str, params: &[SqlValue]) -> Result<u64> {
    let converted = to_sql_params(params);
    client
        .execute(sql, &param_refs(&converted))
        .await
        .map_err(|e| SyncError::query_failed(sql, e))
}

async fn query(client: &Client, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
    let converted = to_sql_params(params);
    let rows = client
        .query(sql, &param_refs(&converted))
        .await
        .map_err(|e| SyncError::query_failed(sql, e))?;
    convert_rows(&rows)
}

async fn prepare(client: &Arc<Client>, sql: &str) -> Result<Box<dyn DriverStatement>> {
    let statement = client
        .prepare(sql)
        .await
        .map_err(|e| SyncError::query_failed(sql, e))?;
    Ok(Box::new(PgStatement {
        client: Arc::clone(client),
        statement,
        sql: sql.to_string(),
    }))
}

type BoxedParam = Box<dyn ToSql + Sync + Send>;

fn to_sql_params(params: &[SqlValue]) -> Vec<BoxedParam> {
    params.iter().map(sql_value_to_tosql).collect()
}

fn param_refs(params: &[BoxedParam]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|b| b.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

/// Convert a SqlValue to a boxed ToSql trait object.
fn sql_value_to_tosql(value: &SqlValue) -> BoxedParam {
    match value {
        SqlValue::Null => Box::new(None::<String>),
        SqlValue::Text(s) => Box::new(s.clone()),
        SqlValue::Int32(i) => Box::new(*i),
        SqlValue::Int64(i) => Box::new(*i),
        SqlValue::Float64(v) => Box::new(*v),
        SqlValue::Bool(b) => Box::new(*b),
        SqlValue::Bytes(b) => Box::new(b.clone()),
    }
}

fn convert_rows(rows: &[tokio_postgres::Row]) -> Result<RawQueryResult> {
    // Column metadata is only available from a row.
    let columns: Vec<ColumnType> = match rows.first() {
        Some(row) => row
            .columns()
            .iter()
            .map(|c| ColumnType::new(c.name(), c.type_().name()))
            .collect(),
        None => Vec::new(),
    };

    let values = rows
        .iter()
        .map(|row| {
            row.columns()
                .iter()
                .enumerate()
                .map(|(i, col)| row_value(row, i, col.type_()))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawQueryResult::new(columns, values))
}

/// Convert the value at `index` to a SqlValue based on its column type.
fn row_value(row: &tokio_postgres::Row, index: usize, ty: &Type) -> Result<SqlValue> {
    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(index)
            .map(|v| v.map(SqlValue::Bool))
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)
            .map(|v| v.map(|n| SqlValue::Int32(n.into())))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)
            .map(|v| v.map(SqlValue::Int32))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(index)
            .map(|v| v.map(SqlValue::Int64))
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)
            .map(|v| v.map(|n| SqlValue::Float64(n.into())))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index)
            .map(|v| v.map(SqlValue::Float64))
    } else if *ty == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(index)
            .map(|v| v.map(SqlValue::Bytes))
    } else {
        row.try_get::<_, Option<String>>(index)
            .map(|v| v.map(SqlValue::Text))
    };

    value
        .map(|v| v.unwrap_or(SqlValue::Null))
        .map_err(|e| {
            SyncError::QueryFailed(format!(
                "cannot read column {} of type {}: {}",
                index,
                ty.name(),
                e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_conversion_keeps_order() {
        let params = vec![
            SqlValue::from("x"),
            SqlValue::Null,
            SqlValue::from(7i64),
        ];
        let converted = to_sql_params(&params);
        assert_eq!(converted.len(), 3);
        assert_eq!(param_refs(&converted).len(), 3);
    }

    #[test]
    fn test_empty_result_has_no_columns() {
        let raw = convert_rows(&[]).unwrap();
        assert!(raw.columns.is_empty());
        assert!(raw.rows.is_empty());
    }
}
