use crate::builders::{Batch, StatementGeneratorConfig};
use crate::clauses::{BindNumbering, BindRows, ColumnEquality};
use crate::error::{Result, SyncError};
use crate::traits::SqlStmtTxtBatcher;
use crate::types::{BindStyle, SqlValue};

/// `delete from ... tgt using (select ... union all ...) src where ...`.
/// Rows carry key values only.
#[derive(Debug, Clone)]
pub struct DeleteGenerator {
    template: DeleteTemplate,
    batch: Batch,
}

#[derive(Debug, Clone)]
struct DeleteTemplate {
    table: String,
    keys: Vec<String>,
    bind_style: BindStyle,
}

impl DeleteGenerator {
    pub fn new(cfg: &StatementGeneratorConfig, bind_style: BindStyle) -> Result<Self> {
        cfg.validate()?;
        if cfg.key_columns.is_empty() {
            return Err(SyncError::MissingConfiguration(format!(
                "delete from {} needs key columns",
                cfg.qualified_table()
            )));
        }
        Ok(Self {
            batch: Batch::new(cfg.key_columns.len()),
            template: DeleteTemplate {
                table: cfg.qualified_table(),
                keys: cfg.key_columns.columns().map(str::to_string).collect(),
                bind_style,
            },
        })
    }
}

impl DeleteTemplate {
    fn build_sql(&self, rows: usize) -> String {
        let keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        let source = BindRows::new(&keys, self.bind_style, BindNumbering::OneBased);
        let join = ColumnEquality::new("src", "tgt", keys.iter().copied());
        format!(
            "delete from {} tgt using ({}) src where {}",
            self.table,
            source.select_union(rows, ""),
            join.build_sql(" and ")
        )
    }
}

impl SqlStmtTxtBatcher for DeleteGenerator {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StatementGeneratorConfig {
        StatementGeneratorConfig::builder()
            .table("t2")
            .key("key1", "a")
            .key("key2", "b")
            .other("ignored", "c")
            .build()
            .unwrap()
    }

    #[test]
    fn test_two_row_delete() {
        let mut gen = DeleteGenerator::new(&config(), BindStyle::Colon).unwrap();
        gen.init_batch(2);
        assert!(!gen.add_values_to_batch(vec!["x".into(), "y".into()]).unwrap());
        assert!(gen.add_values_to_batch(vec!["p".into(), "q".into()]).unwrap());

        assert_eq!(
            gen.statement(),
            "delete from t2 tgt using (select :1 as a,:2 as b union all select :3,:4) src \
             where src.a = tgt.a and src.b = tgt.b"
        );
        assert_eq!(
            gen.values(),
            &[
                SqlValue::from("x"),
                SqlValue::from("y"),
                SqlValue::from("p"),
                SqlValue::from("q"),
            ]
        );
    }

    #[test]
    fn test_only_keys_accepted() {
        let mut gen = DeleteGenerator::new(&config(), BindStyle::Colon).unwrap();
        gen.init_batch(1);
        assert!(matches!(
            gen.add_values_to_batch(vec!["x".into(), "y".into(), 1.into()]),
            Err(SyncError::ArgumentCount {
                expected: 2,
                actual: 3
            })
        ));
    }
}
