mod connection;
mod dialect;
mod row;
mod schema_name;
mod sql_value;

pub use connection::ConnectionDetails;
pub use dialect::{BindStyle, Dialect};
pub use row::{ColumnType, RawQueryResult, Rows};
pub use schema_name::SchemaQualifiedName;
pub use sql_value::{format_args_list, SqlValue};
