use thiserror::Error;

/// Error type for tablesync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Wrong number of values: expected {expected}, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("Batch is full ({capacity} row(s)); render and execute it before adding more")]
    BatchFull { capacity: usize },

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Driver plugin {plugin:?} is not installed")]
    PluginLoad { plugin: String },

    #[error("Driver plugin {plugin:?} does not implement {contract}")]
    PluginContract { plugin: String, contract: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction is already committed or rolled back")]
    TransactionClosed,

    #[error("Connection already has an open transaction")]
    TransactionInProgress,

    #[error("Statement is closed: {0}")]
    StatementClosed(String),

    #[error("Rows are closed")]
    RowsClosed,

    #[error("No current row; call next() before scan()")]
    NoCurrentRow,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out")]
    Timeout,

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

impl SyncError {
    pub fn argument_count(expected: usize, actual: usize) -> Self {
        SyncError::ArgumentCount { expected, actual }
    }

    pub fn plugin_load(plugin: impl Into<String>) -> Self {
        SyncError::PluginLoad {
            plugin: plugin.into(),
        }
    }

    pub fn plugin_contract(plugin: impl Into<String>, contract: impl Into<String>) -> Self {
        SyncError::PluginContract {
            plugin: plugin.into(),
            contract: contract.into(),
        }
    }

    /// Wrap a driver error with the operation that produced it.
    pub fn query_failed(context: &str, err: impl std::fmt::Display) -> Self {
        SyncError::QueryFailed(format!("{}: {}", context, err))
    }
}

/// Result type alias for tablesync operations
pub type Result<T> = std::result::Result<T, SyncError>;
