use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::connector::{Client, Connector};
use crate::drivers::TokioPostgresDriver;
use crate::error::Result;
use crate::plugins::{ConnectorFactory, DriverPlugin, RawSqlExecutor};
use crate::traits::DatabaseDriver;
use crate::types::{ConnectionDetails, Dialect};

/// Statically linked PostgreSQL driver.
#[derive(Debug, Default)]
pub struct PostgresPlugin;

impl DriverPlugin for PostgresPlugin {
    fn name(&self) -> &str {
        "postgres"
    }

    fn connector_factory(&self) -> Option<&dyn ConnectorFactory> {
        Some(self)
    }

    fn raw_sql_executor(&self) -> Option<&dyn RawSqlExecutor> {
        Some(self)
    }
}

#[async_trait]
impl ConnectorFactory for PostgresPlugin {
    async fn connect(&self, details: &ConnectionDetails) -> Result<Connector> {
        let driver = TokioPostgresDriver::connect(details.dsn()?).await?;
        Ok(Connector::new(
            Dialect::Postgres,
            Client::Standard(Arc::new(driver)),
        ))
    }
}

#[async_trait]
impl RawSqlExecutor for PostgresPlugin {
    async fn exec_raw(&self, details: &ConnectionDetails, sql: &str) -> Result<()> {
        let driver = TokioPostgresDriver::connect(details.dsn()?).await?;
        debug!("exec raw: {}", sql);
        let res = driver.execute(sql, &[]).await;
        driver.close().await?;
        res.map(|_| ())
    }
}
