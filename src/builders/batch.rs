use tracing::trace;

use crate::error::{Result, SyncError};
use crate::types::SqlValue;

/// Upper bound on values reserved up front by [`Batch::init`].
const MAX_PREALLOCATED_VALUES: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct RenderedStatement {
    capacity: usize,
    rows: usize,
    sql: String,
}

/// Row accumulator shared by every statement generator.
///
/// Holds a flat value list of `rows * arity` entries and the last rendered
/// statement. The rendered text is reused until either the batch capacity
/// or the number of rows in it changes.
#[derive(Debug, Clone)]
pub(crate) struct Batch {
    arity: usize,
    capacity: usize,
    rows: usize,
    values: Vec<SqlValue>,
    rendered: Option<RenderedStatement>,
}

impl Batch {
    pub(crate) fn new(arity: usize) -> Self {
        Self {
            arity,
            capacity: 0,
            rows: 0,
            values: Vec::new(),
            rendered: None,
        }
    }

    pub(crate) fn init(&mut self, capacity: usize) {
        if self
            .rendered
            .as_ref()
            .is_some_and(|r| r.capacity != capacity)
        {
            trace!(
                old = self.capacity,
                new = capacity,
                "batch capacity changed; dropping rendered statement"
            );
            self.rendered = None;
        }
        self.capacity = capacity;
        self.rows = 0;
        self.values = Vec::with_capacity(
            capacity
                .saturating_mul(self.arity)
                .min(MAX_PREALLOCATED_VALUES),
        );
    }

    /// Append one row. Returns true when the batch has reached capacity.
    pub(crate) fn add(&mut self, values: Vec<SqlValue>) -> Result<bool> {
        if values.len() != self.arity {
            return Err(SyncError::argument_count(self.arity, values.len()));
        }
        if self.rows >= self.capacity {
            return Err(SyncError::BatchFull {
                capacity: self.capacity,
            });
        }
        self.values.extend(values);
        self.rows += 1;
        Ok(self.rows == self.capacity)
    }

    pub(crate) fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Return the cached statement, or build one for the current row count.
    /// An empty batch has no statement and renders as an empty string.
    pub(crate) fn render(&mut self, build: impl FnOnce(usize) -> String) -> String {
        if self.rows == 0 {
            return String::new();
        }
        if let Some(r) = &self.rendered {
            if r.capacity == self.capacity && r.rows == self.rows {
                return r.sql.clone();
            }
        }
        trace!(capacity = self.capacity, rows = self.rows, "rendering statement");
        let sql = build(self.rows);
        self.rendered = Some(RenderedStatement {
            capacity: self.capacity,
            rows: self.rows,
            sql: sql.clone(),
        });
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_batch_reporting() {
        let mut batch = Batch::new(2);
        batch.init(3);
        assert!(!batch.add(vec![1.into(), 2.into()]).unwrap());
        assert!(!batch.add(vec![3.into(), 4.into()]).unwrap());
        assert!(batch.add(vec![5.into(), 6.into()]).unwrap());
        assert!(matches!(
            batch.add(vec![7.into(), 8.into()]),
            Err(SyncError::BatchFull { capacity: 3 })
        ));
        assert_eq!(batch.values().len(), 6);
    }

    #[test]
    fn test_wrong_arity() {
        let mut batch = Batch::new(2);
        batch.init(1);
        assert!(matches!(
            batch.add(vec![1.into()]),
            Err(SyncError::ArgumentCount {
                expected: 2,
                actual: 1
            })
        ));
        assert!(batch.values().is_empty());
    }

    #[test]
    fn test_uninitialised_batch_is_full() {
        let mut batch = Batch::new(1);
        assert!(matches!(
            batch.add(vec![1.into()]),
            Err(SyncError::BatchFull { capacity: 0 })
        ));
    }

    #[test]
    fn test_empty_batch_skips_builder() {
        let mut batch = Batch::new(2);
        batch.init(3);
        assert_eq!(batch.render(|_| unreachable!()), "");
    }

    #[test]
    fn test_init_saturates_reservation() {
        let mut batch = Batch::new(3);
        batch.init(usize::MAX);
        assert!(!batch.add(vec![1.into(), 2.into(), 3.into()]).unwrap());
    }

    #[test]
    fn test_render_cache() {
        let mut batch = Batch::new(1);
        batch.init(2);
        batch.add(vec![1.into()]).unwrap();
        batch.add(vec![2.into()]).unwrap();

        let mut calls = 0;
        let first = batch.render(|rows| {
            calls += 1;
            format!("rows={}", rows)
        });
        let second = batch.render(|rows| {
            calls += 1;
            format!("again rows={}", rows)
        });
        assert_eq!(first, "rows=2");
        assert_eq!(first, second);
        assert_eq!(calls, 1);

        // Same capacity, same row count: cache survives init.
        batch.init(2);
        batch.add(vec![3.into()]).unwrap();
        batch.add(vec![4.into()]).unwrap();
        assert_eq!(batch.render(|_| "fresh".to_string()), "rows=2");
        assert_eq!(batch.values(), &[SqlValue::Int32(3), SqlValue::Int32(4)]);

        // Capacity change forces a re-render.
        batch.init(1);
        batch.add(vec![5.into()]).unwrap();
        assert_eq!(batch.render(|rows| format!("rows={}", rows)), "rows=1");
    }
}
