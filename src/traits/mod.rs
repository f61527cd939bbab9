mod batcher;
mod driver;

pub use batcher::SqlStmtTxtBatcher;
pub use driver::{
    ArrayBindDriver, BatchStatement, BatchTransaction, DatabaseDriver, DriverStatement,
    DriverTransaction,
};
