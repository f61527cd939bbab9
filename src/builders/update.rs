use crate::builders::{Batch, StatementGeneratorConfig};
use crate::clauses::{BindNumbering, BindRows, ColumnEquality};
use crate::error::{Result, SyncError};
use crate::traits::SqlStmtTxtBatcher;
use crate::types::{BindStyle, SqlValue};

/// `update ... tgt set ... from (select ... union all ...) src where ...`.
///
/// Each row supplies key values first, then other values; the key columns
/// drive the `where` join back to the target.
#[derive(Debug, Clone)]
pub struct UpdateGenerator {
    template: UpdateTemplate,
    batch: Batch,
}

#[derive(Debug, Clone)]
struct UpdateTemplate {
    table: String,
    keys: Vec<String>,
    others: Vec<String>,
    bind_style: BindStyle,
}

impl UpdateGenerator {
    pub fn new(cfg: &StatementGeneratorConfig, bind_style: BindStyle) -> Result<Self> {
        cfg.validate()?;
        if cfg.key_columns.is_empty() {
            return Err(SyncError::MissingConfiguration(format!(
                "update of {} needs key columns",
                cfg.qualified_table()
            )));
        }
        if cfg.other_columns.is_empty() {
            return Err(SyncError::MissingConfiguration(format!(
                "update of {} needs non-key columns to set",
                cfg.qualified_table()
            )));
        }
        Ok(Self {
            batch: Batch::new(cfg.column_count()),
            template: UpdateTemplate {
                table: cfg.qualified_table(),
                keys: cfg.key_columns.columns().map(str::to_string).collect(),
                others: cfg.other_columns.columns().map(str::to_string).collect(),
                bind_style,
            },
        })
    }
}

impl UpdateTemplate {
    fn build_sql(&self, rows: usize) -> String {
        let cols: Vec<&str> = self
            .keys
            .iter()
            .chain(self.others.iter())
            .map(String::as_str)
            .collect();
        let source = BindRows::new(&cols, self.bind_style, BindNumbering::OneBased);
        let set = ColumnEquality::new("tgt", "src", self.others.iter().map(String::as_str));
        let join = ColumnEquality::new("src", "tgt", self.keys.iter().map(String::as_str));
        format!(
            "update {} tgt set {} from ({}) src where {}",
            self.table,
            set.build_sql(","),
            source.select_union(rows, ""),
            join.build_sql(" and ")
        )
    }
}

impl SqlStmtTxtBatcher for UpdateGenerator {
    fn init_batch(&mut self, size: usize) {
        self.batch.init(size);
    }

    fn add_values_to_batch(&mut self, values: Vec<SqlValue>) -> Result<bool> {
        self.batch.add(values)
    }

    fn values(&self) -> &[SqlValue] {
        self.batch.values()
    }

    fn statement(&mut self) -> String {
        self.batch.render(|rows| self.template.build_sql(rows))
    }
}
