use crate::builders::{Batch, StatementGeneratorConfig};
use crate::clauses::{BindNumbering, BindRows};
use crate::error::{Result, SyncError};
use crate::traits::SqlStmtTxtBatcher;
use crate::types::{BindStyle, SqlValue};

/// Multi-row `insert into ... values (...),(...)`.
///
/// Rows take keys then other columns; binds are numbered from 1 across the
/// whole statement.
#[derive(Debug, Clone)]
pub struct InsertGenerator {
    template: InsertTemplate,
    batch: Batch,
}

#[derive(Debug, Clone)]
struct InsertTemplate {
    table: String,
    columns: Vec<String>,
    bind_style: BindStyle,
}

impl InsertGenerator {
    pub fn new(cfg: &StatementGeneratorConfig, bind_style: BindStyle) -> Result<Self> {
        cfg.validate()?;
        let columns: Vec<String> = cfg.columns().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(SyncError::MissingConfiguration(format!(
                "insert into {} needs at least one column",
                cfg.qualified_table()
            )));
        }
        Ok(Self {
            batch: Batch::new(columns.len()),
            template: InsertTemplate {
                table: cfg.qualified_table(),
                columns,
                bind_style,
            },
        })
    }
}

impl InsertTemplate {
    fn build_sql(&self, rows: usize) -> String {
        let cols: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let binds = BindRows::new(&cols, self.bind_style, BindNumbering::OneBased);
        format!(
            "insert into {} ({}) values {}",
            self.table,
            cols.join(","),
            binds.values_tuples(rows)
        )
    }
}

impl SqlStmtTxtBatcher for InsertGenerator {
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
