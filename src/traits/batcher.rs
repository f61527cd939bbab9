use crate::error::Result;
use crate::types::SqlValue;

/// A DML statement generator that batches many logical rows into one
/// parameterized statement.
///
/// Usage per batch: [`init_batch`](Self::init_batch), then
/// [`add_values_to_batch`](Self::add_values_to_batch) until it reports the
/// batch is full (or the input runs out), then execute
/// [`statement`](Self::statement) with [`values`](Self::values) as bind
/// arguments.
pub trait SqlStmtTxtBatcher: Send {
    /// Start a new batch holding up to `size` rows.
    fn init_batch(&mut self, size: usize);

    /// Append one row of values in canonical column order.
    /// Returns true when the batch is now full.
    fn add_values_to_batch(&mut self, values: Vec<SqlValue>) -> Result<bool>;

    /// Flat bind values for every row added so far.
    fn values(&self) -> &[SqlValue];

    /// SQL text for the rows added so far.
    ///
    /// Empty when no rows were added; there is nothing to execute.
    fn statement(&mut self) -> String;
}
