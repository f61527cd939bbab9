use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// How positional bind variables are written into SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindStyle {
    /// `:1`, `:2`, ...
    #[default]
    Colon,
    /// `$1`, `$2`, ...
    Dollar,
    /// `?` (position is implicit)
    Question,
}

impl BindStyle {
    pub fn placeholder(self, index: usize) -> String {
        match self {
            BindStyle::Colon => format!(":{}", index),
            BindStyle::Dollar => format!("${}", index),
            BindStyle::Question => "?".to_string(),
        }
    }
}

/// Database products the connector layer knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Oracle,
    SqlServer,
    Snowflake,
    Netezza,
    Odbc,
    Postgres,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::Oracle,
        Dialect::SqlServer,
        Dialect::Snowflake,
        Dialect::Netezza,
        Dialect::Odbc,
        Dialect::Postgres,
    ];

    /// Tag returned by `Connector::get_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Oracle => "oracle",
            Dialect::SqlServer => "sqlserver",
            Dialect::Snowflake => "snowflake",
            Dialect::Netezza => "netezza",
            Dialect::Odbc => "odbc",
            Dialect::Postgres => "postgres",
        }
    }

    pub fn bind_style(self) -> BindStyle {
        match self {
            Dialect::Postgres => BindStyle::Dollar,
            Dialect::SqlServer | Dialect::Odbc => BindStyle::Question,
            Dialect::Oracle | Dialect::Snowflake | Dialect::Netezza => BindStyle::Colon,
        }
    }

    /// Name of the driver plugin that opens connections for this dialect.
    pub fn plugin_name(self) -> &'static str {
        match self {
            Dialect::Oracle => "oracle",
            Dialect::SqlServer | Dialect::Snowflake | Dialect::Netezza | Dialect::Odbc => "odbc",
            Dialect::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        match tag.as_str() {
            "oracle" => Ok(Dialect::Oracle),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "snowflake" => Ok(Dialect::Snowflake),
            "netezza" => Ok(Dialect::Netezza),
            "odbc" => Ok(Dialect::Odbc),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            _ => Err(SyncError::UnknownDialect(s.to_string())),
        }
    }
}
