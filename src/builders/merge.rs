use crate::builders::{Batch, StatementGeneratorConfig};
use crate::clauses::{BindNumbering, BindRows, ColumnEquality};
use crate::error::{Result, SyncError};
use crate::traits::SqlStmtTxtBatcher;
use crate::types::{BindStyle, SqlValue};

/// Oracle-style `merge into ... using (select ... from dual union all ...)`.
///
/// Bind numbering here is zero-based and derived from each row's position in
/// the batch (`row * column_count + column`), unlike the other generators.
/// Existing callers depend on this numbering.
#[derive(Debug, Clone)]
pub struct MergeGenerator {
    template: MergeTemplate,
    batch: Batch,
}

#[derive(Debug, Clone)]
struct MergeTemplate {
    table: String,
    keys: Vec<String>,
    others: Vec<String>,
    bind_style: BindStyle,
}

impl MergeGenerator {
    pub fn new(cfg: &StatementGeneratorConfig, bind_style: BindStyle) -> Result<Self> {
        cfg.validate()?;
        if cfg.key_columns.is_empty() {
            return Err(SyncError::MissingConfiguration(format!(
                "merge into {} needs key columns",
                cfg.qualified_table()
            )));
        }
        Ok(Self {
            batch: Batch::new(cfg.column_count()),
            template: MergeTemplate {
                table: cfg.qualified_table(),
                keys: cfg.key_columns.columns().map(str::to_string).collect(),
                others: cfg.other_columns.columns().map(str::to_string).collect(),
                bind_style,
            },
        })
    }
}

impl MergeTemplate {
    fn build_sql(&self, rows: usize) -> String {
        let cols: Vec<&str> = self
            .keys
            .iter()
            .chain(self.others.iter())
            .map(String::as_str)
            .collect();
        let source = BindRows::new(&cols, self.bind_style, BindNumbering::ZeroBased);
        let on = ColumnEquality::new("S", "T", self.keys.iter().map(String::as_str));

        let mut sql = format!(
            "merge into {} T using ({}) S on ({})",
            self.table,
            source.select_union(rows, " from dual"),
            on.build_sql(",")
        );
        // Key-only tables have nothing to update.
        if !self.others.is_empty() {
            let set = ColumnEquality::new("T", "S", self.others.iter().map(String::as_str));
            sql.push_str(" when matched then update set ");
            sql.push_str(&set.build_sql(","));
        }
        let source_cols: Vec<String> = cols.iter().map(|c| format!("s.{}", c)).collect();
        sql.push_str(&format!(
            " when not matched then insert ({}) values ({})",
            cols.join(","),
            source_cols.join(",")
        ));
        sql
    }
}

impl SqlStmtTxtBatcher for MergeGenerator {
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
