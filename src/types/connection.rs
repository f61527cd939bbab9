use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::types::Dialect;

/// Everything needed to open a connection: a dialect tag plus free-form
/// credentials. Only the `dsn` entry is interpreted here; drivers read the
/// rest as they need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDetails {
    #[serde(rename = "type")]
    pub dialect: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl ConnectionDetails {
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get_type(&self) -> &str {
        &self.dialect
    }

    pub fn parsed_dialect(&self) -> Result<Dialect> {
        self.dialect.parse()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|s| s.as_str())
    }

    pub fn dsn(&self) -> Result<&str> {
        self.get("dsn").ok_or_else(|| {
            SyncError::MissingConfiguration(format!(
                "connection of type {:?} has no dsn",
                self.dialect
            ))
        })
    }
}
