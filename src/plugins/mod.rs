//! Driver plugin registry.
//!
//! Heavy native drivers (Oracle OCI, ODBC) are not linked into this crate.
//! The embedding application registers them by name; dialects resolve to a
//! plugin through [`Dialect::plugin_name`]. Lookups distinguish a driver that
//! is not installed ([`SyncError::PluginLoad`]) from one that is installed but
//! lacks a capability ([`SyncError::PluginContract`]).

mod contracts;
mod postgres;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::connector::Connector;
use crate::error::{Result, SyncError};
use crate::types::{ConnectionDetails, Dialect};

pub use contracts::{
    ChangeEvent, ChangeNotificationExecutor, ChangeNotificationFactory, ChangeOperation,
    ConnectorFactory, DriverPlugin, RawSqlExecutor,
};
pub use postgres::PostgresPlugin;

/// Registry of driver plugins keyed by name.
///
/// Built once at startup and read-only afterwards.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = PluginRegistry::with_builtins();
/// registry.register(MyOraclePlugin::new());
///
/// let connector = registry.open(&details).await?;
/// ```
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn DriverPlugin>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the statically linked drivers registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(PostgresPlugin);
        registry
    }

    /// Register a plugin under its own name, replacing any previous one.
    pub fn register(&mut self, plugin: impl DriverPlugin + 'static) {
        self.register_arc(Arc::new(plugin));
    }

    pub fn register_arc(&mut self, plugin: Arc<dyn DriverPlugin>) {
        debug!(plugin = plugin.name(), "registering driver plugin");
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Registered plugin names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Look up a plugin by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn DriverPlugin>> {
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| SyncError::plugin_load(name))
    }

    fn resolve_for(&self, details: &ConnectionDetails) -> Result<Arc<dyn DriverPlugin>> {
        let dialect: Dialect = details.parsed_dialect()?;
        self.resolve(dialect.plugin_name())
    }

    /// Open a connector for `details` through its dialect's plugin.
    pub async fn open(&self, details: &ConnectionDetails) -> Result<Connector> {
        let plugin = self.resolve_for(details)?;
        let factory = plugin
            .connector_factory()
            .ok_or_else(|| SyncError::plugin_contract(plugin.name(), "ConnectorFactory"))?;
        let connector = factory.connect(details).await?;
        info!(
            plugin = plugin.name(),
            dialect = connector.get_type(),
            kind = ?connector.client_kind(),
            "connection opened"
        );
        Ok(connector)
    }

    /// Run one raw statement (e.g. DDL) against `details`.
    pub async fn exec_raw(&self, details: &ConnectionDetails, sql: &str) -> Result<()> {
        let plugin = self.resolve_for(details)?;
        let executor = plugin
            .raw_sql_executor()
            .ok_or_else(|| SyncError::plugin_contract(plugin.name(), "RawSqlExecutor"))?;
        executor.exec_raw(details, sql).await
    }

    /// Build an Oracle change-notification executor for `dsn`.
    pub async fn change_notification_executor(
        &self,
        dsn: &str,
    ) -> Result<Box<dyn ChangeNotificationExecutor>> {
        let plugin = self.resolve(Dialect::Oracle.plugin_name())?;
        let factory = plugin.change_notification_factory().ok_or_else(|| {
            SyncError::plugin_contract(plugin.name(), "ChangeNotificationFactory")
        })?;
        factory.change_notification_executor(dsn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let registry = PluginRegistry::with_builtins();
        assert!(registry.contains("postgres"));
        assert!(!registry.contains("oracle"));
        assert_eq!(registry.names(), vec!["postgres"]);
    }

    #[test]
    fn test_missing_plugin_is_load_error() {
        let registry = PluginRegistry::with_builtins();
        match registry.resolve("oracle") {
            Err(SyncError::PluginLoad { plugin }) => assert_eq!(plugin, "oracle"),
            Err(other) => panic!("Expected PluginLoad error, got {:?}", other),
            Ok(_) => panic!("Expected PluginLoad error"),
        }
    }

    #[tokio::test]
    async fn test_open_unknown_dialect() {
        let registry = PluginRegistry::with_builtins();
        let details = ConnectionDetails::new("db2").with("dsn", "x");
        assert!(matches!(
            registry.open(&details).await,
            Err(SyncError::UnknownDialect(_))
        ));
    }

    #[tokio::test]
    async fn test_plugin_without_capability_is_contract_error() {
        struct Oracleish;
        impl DriverPlugin for Oracleish {
            fn name(&self) -> &str {
                "oracle"
            }
        }

        let mut registry = PluginRegistry::new();
        registry.register(Oracleish);
        assert!(matches!(
            registry.change_notification_executor("user/pass@db").await,
            Err(SyncError::PluginContract { plugin, contract })
                if plugin == "oracle" && contract == "ChangeNotificationFactory"
        ));
    }
}
