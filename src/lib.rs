//! tablesync - batched DML generation over a uniform multi-database connector
//!
//! # Example
//! ```ignore
//! use tablesync::{ConnectionDetails, PluginRegistry, StatementGeneratorConfig};
//!
//! // Open a connection through the driver registry
//! let registry = PluginRegistry::with_builtins();
//! let details = ConnectionDetails::new("postgres").with("dsn", "host=localhost dbname=sales");
//! let connector = registry.open(&details).await?;
//!
//! // Build a batched upsert
//! let cfg = StatementGeneratorConfig::builder()
//!     .table("sales.orders")
//!     .key("id", "order_id")
//!     .other("total", "amount")
//!     .build()?;
//! let mut insert = connector.dml_generator().new_insert_generator(&cfg)?;
//! insert.init_batch(2);
//! insert.add_values_to_batch(vec![1.into(), 9.5.into()])?;
//! insert.add_values_to_batch(vec![2.into(), 3.0.into()])?;
//!
//! let mut tx = connector.begin().await?;
//! tx.exec(&insert.statement(), insert.values()).await?;
//! tx.commit().await?;
//! ```

pub mod builders;
pub mod clauses;
pub mod drivers;
pub mod error;
pub mod plugins;
pub mod traits;
pub mod types;

mod connector;
mod context;
mod dml;

// Re-export main types for convenient access
pub use builders::{ColumnMapping, StatementGeneratorConfig};
pub use connector::{Client, ClientKind, Connector, Statement, Transacter};
pub use context::Context;
pub use dml::DmlGenerator;
pub use error::{Result, SyncError};
pub use plugins::PluginRegistry;
pub use traits::{ArrayBindDriver, DatabaseDriver, SqlStmtTxtBatcher};
pub use types::{
    BindStyle, ColumnType, ConnectionDetails, Dialect, RawQueryResult, Rows,
    SchemaQualifiedName, SqlValue,
};
