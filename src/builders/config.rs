use crate::error::{Result, SyncError};
use crate::types::SchemaQualifiedName;

/// Ordered `(logical field, physical column)` pairs.
/// Insertion order is the order columns appear in generated SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pairs: Vec<(String, String)>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, column: impl Into<String>) {
        self.pairs.push((field.into(), column.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(f, c)| (f.as_str(), c.as_str()))
    }

    /// Physical column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(_, c)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<F: Into<String>, C: Into<String>> FromIterator<(F, C)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (F, C)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(f, c)| (f.into(), c.into()))
                .collect(),
        }
    }
}

/// Target table and column layout shared by all statement generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementGeneratorConfig {
    pub output_schema: String,
    /// `"."` when `output_schema` is set, otherwise empty.
    pub schema_separator: String,
    pub output_table: String,
    pub key_columns: ColumnMapping,
    pub other_columns: ColumnMapping,
}

impl StatementGeneratorConfig {
    pub fn builder() -> StatementGeneratorConfigBuilder {
        StatementGeneratorConfigBuilder::default()
    }

    /// `schema.table`, or just `table`.
    pub fn qualified_table(&self) -> String {
        format!(
            "{}{}{}",
            self.output_schema, self.schema_separator, self.output_table
        )
    }

    /// Keys then others: the order values must be supplied in.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.key_columns.columns().chain(self.other_columns.columns())
    }

    pub fn column_count(&self) -> usize {
        self.key_columns.len() + self.other_columns.len()
    }

    /// Check the invariants every generator relies on.
    ///
    /// The fields are public, so generators call this themselves rather than
    /// trusting that the config came from the builder.
    pub fn validate(&self) -> Result<()> {
        if self.output_table.trim().is_empty() {
            return Err(SyncError::MissingConfiguration(
                "output table name".to_string(),
            ));
        }
        if let Some(dup) = self
            .key_columns
            .columns()
            .find(|k| self.other_columns.columns().any(|o| o == *k))
        {
            return Err(SyncError::InvalidConfiguration(format!(
                "column {} is both a key and a non-key column",
                dup
            )));
        }
        Ok(())
    }
}

/// Builder for [`StatementGeneratorConfig`].
#[derive(Debug, Default)]
pub struct StatementGeneratorConfigBuilder {
    schema: Option<String>,
    table: Option<String>,
    key_columns: ColumnMapping,
    other_columns: ColumnMapping,
}

impl StatementGeneratorConfigBuilder {
    /// Set the target from a possibly schema-qualified name.
    /// An explicit [`schema`](Self::schema) call still wins.
    pub fn table(mut self, name: impl Into<SchemaQualifiedName>) -> Self {
        let name = name.into();
        if name.has_schema() && self.schema.is_none() {
            self.schema = Some(name.schema().to_string());
        }
        self.table = Some(name.object().to_string());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn key(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.key_columns.push(field, column);
        self
    }

    pub fn other(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.other_columns.push(field, column);
        self
    }

    pub fn key_columns(mut self, mapping: ColumnMapping) -> Self {
        self.key_columns = mapping;
        self
    }

    pub fn other_columns(mut self, mapping: ColumnMapping) -> Self {
        self.other_columns = mapping;
        self
    }

    pub fn build(self) -> Result<StatementGeneratorConfig> {
        let output_schema = self.schema.unwrap_or_default();
        let schema_separator = if output_schema.is_empty() { "" } else { "." };

        let cfg = StatementGeneratorConfig {
            schema_separator: schema_separator.to_string(),
            output_schema,
            output_table: self.table.unwrap_or_default(),
            key_columns: self.key_columns,
            other_columns: self.other_columns,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
