mod bind_rows;
mod equality;

pub use bind_rows::{BindNumbering, BindRows};
pub use equality::ColumnEquality;
