use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::connector::Connector;
use crate::context::Context;
use crate::error::Result;
use crate::types::{ConnectionDetails, SchemaQualifiedName};

/// A loadable database driver.
///
/// A plugin advertises which capabilities it provides by returning `Some`
/// from the matching accessor. Callers ask for the capability they need and
/// get [`SyncError::PluginContract`](crate::SyncError::PluginContract) when
/// it is missing.
pub trait DriverPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn connector_factory(&self) -> Option<&dyn ConnectorFactory> {
        None
    }

    fn raw_sql_executor(&self) -> Option<&dyn RawSqlExecutor> {
        None
    }

    fn change_notification_factory(&self) -> Option<&dyn ChangeNotificationFactory> {
        None
    }
}

/// Opens connectors from connection details.
#[async_trait]
pub trait ConnectorFactory: Send + Sync {
    async fn connect(&self, details: &ConnectionDetails) -> Result<Connector>;
}

/// Runs one raw SQL statement (typically DDL) on a short-lived connection.
#[async_trait]
pub trait RawSqlExecutor: Send + Sync {
    async fn exec_raw(&self, details: &ConnectionDetails, sql: &str) -> Result<()>;
}

/// Builds change-notification executors from a DSN.
#[async_trait]
pub trait ChangeNotificationFactory: Send + Sync {
    async fn change_notification_executor(
        &self,
        dsn: &str,
    ) -> Result<Box<dyn ChangeNotificationExecutor>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOperation {
    Insert,
    Update,
    Delete,
}

/// One changed row reported by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: String,
    pub row_id: String,
    pub operation: ChangeOperation,
}

/// Subscribes to row changes on a table and forwards them to a channel
/// until the context is cancelled.
#[async_trait]
pub trait ChangeNotificationExecutor: Send {
    async fn listen(
        &mut self,
        ctx: &Context,
        table: &SchemaQualifiedName,
        events: mpsc::Sender<ChangeEvent>,
    ) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}
