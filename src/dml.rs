use crate::builders::{
    DeleteGenerator, InsertGenerator, MergeGenerator, StatementGeneratorConfig, UpdateGenerator,
};
use crate::error::{Result, SyncError};
use crate::traits::SqlStmtTxtBatcher;
use crate::types::{BindStyle, Dialect};

/// Statement generator factory.
/// Obtained from a [`Connector`](crate::Connector) so generated SQL uses the
/// connection's bind variable syntax.
///
/// A generator made for a dialect refuses statement shapes that dialect
/// cannot run. PostgreSQL has no update or merge generator: the update
/// template qualifies `SET` targets and the merge template selects from
/// `dual` with zero-based binds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DmlGenerator {
    bind_style: BindStyle,
    dialect: Option<Dialect>,
}

impl DmlGenerator {
    /// A generator with the given bind syntax and no dialect restrictions.
    pub fn new(bind_style: BindStyle) -> Self {
        Self {
            bind_style,
            dialect: None,
        }
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            bind_style: dialect.bind_style(),
            dialect: Some(dialect),
        }
    }

    pub fn bind_style(&self) -> BindStyle {
        self.bind_style
    }

    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }

    fn ensure_supported(&self, statement: &str) -> Result<()> {
        match self.dialect {
            Some(Dialect::Postgres) => Err(SyncError::UnsupportedOperation(format!(
                "{} statements cannot be generated for {}",
                statement,
                Dialect::Postgres
            ))),
            _ => Ok(()),
        }
    }

    pub fn new_insert_generator(
        &self,
        cfg: &StatementGeneratorConfig,
    ) -> Result<Box<dyn SqlStmtTxtBatcher>> {
        Ok(Box::new(InsertGenerator::new(cfg, self.bind_style)?))
    }

    pub fn new_update_generator(
        &self,
        cfg: &StatementGeneratorConfig,
    ) -> Result<Box<dyn SqlStmtTxtBatcher>> {
        self.ensure_supported("update")?;
        Ok(Box::new(UpdateGenerator::new(cfg, self.bind_style)?))
    }

    pub fn new_delete_generator(
        &self,
        cfg: &StatementGeneratorConfig,
    ) -> Result<Box<dyn SqlStmtTxtBatcher>> {
        Ok(Box::new(DeleteGenerator::new(cfg, self.bind_style)?))
    }

    pub fn new_merge_generator(
        &self,
        cfg: &StatementGeneratorConfig,
    ) -> Result<Box<dyn SqlStmtTxtBatcher>> {
        self.ensure_supported("merge")?;
        Ok(Box::new(MergeGenerator::new(cfg, self.bind_style)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_bind_style() {
        assert_eq!(
            DmlGenerator::for_dialect(Dialect::Postgres).bind_style(),
            BindStyle::Dollar
        );
        assert_eq!(DmlGenerator::default().bind_style(), BindStyle::Colon);
        assert_eq!(DmlGenerator::default().dialect(), None);
    }

    #[test]
    fn test_postgres_rejects_update_and_merge() {
        let cfg = StatementGeneratorConfig::builder()
            .table("t")
            .key("id", "id")
            .other("v", "v")
            .build()
            .unwrap();
        let pg = DmlGenerator::for_dialect(Dialect::Postgres);
        assert!(pg.new_insert_generator(&cfg).is_ok());
        assert!(pg.new_delete_generator(&cfg).is_ok());
        assert!(matches!(
            pg.new_update_generator(&cfg),
            Err(SyncError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            pg.new_merge_generator(&cfg),
            Err(SyncError::UnsupportedOperation(_))
        ));

        // Same bind style without the dialect tag is not restricted.
        let dollar = DmlGenerator::new(BindStyle::Dollar);
        assert!(dollar.new_update_generator(&cfg).is_ok());
    }
}
