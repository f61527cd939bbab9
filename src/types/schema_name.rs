use std::fmt;
use std::sync::OnceLock;

/// A `[schema.]object` name as supplied by a caller.
///
/// Double quotes delimit identifiers that may themselves contain dots, so
/// `"random.table"` is a single object with no schema while `sales."q1.totals"`
/// is the object `"q1.totals"` in schema `sales`. Quotes are kept in the parts
/// so they can be pasted into SQL unchanged.
#[derive(Debug, Clone)]
pub struct SchemaQualifiedName {
    raw: String,
    parts: OnceLock<(String, String)>,
}

impl SchemaQualifiedName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            parts: OnceLock::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Schema part, empty when the name is unqualified.
    pub fn schema(&self) -> &str {
        &self.parsed().0
    }

    pub fn object(&self) -> &str {
        &self.parsed().1
    }

    pub fn has_schema(&self) -> bool {
        !self.schema().is_empty()
    }

    /// `"."` when a schema is present, otherwise empty.
    pub fn separator(&self) -> &'static str {
        if self.has_schema() {
            "."
        } else {
            ""
        }
    }

    fn parsed(&self) -> &(String, String) {
        self.parts.get_or_init(|| split_qualified_name(self.raw.trim()))
    }
}

impl PartialEq for SchemaQualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for SchemaQualifiedName {}

impl fmt::Display for SchemaQualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.schema(), self.separator(), self.object())
    }
}

impl From<&str> for SchemaQualifiedName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SchemaQualifiedName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Split on the first dot that is outside double quotes.
fn split_qualified_name(name: &str) -> (String, String) {
    let mut in_quotes = false;
    for (i, ch) in name.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                return (name[..i].to_string(), name[i + 1..].to_string());
            }
            _ => {}
        }
    }
    (String::new(), name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unqualified() {
        let name = SchemaQualifiedName::new("orders");
        assert_eq!(name.schema(), "");
        assert_eq!(name.object(), "orders");
        assert_eq!(name.separator(), "");
        assert_eq!(name.to_string(), "orders");
    }

    #[test]
    fn test_qualified() {
        let name = SchemaQualifiedName::new("sales.orders");
        assert_eq!(name.schema(), "sales");
        assert_eq!(name.object(), "orders");
        assert_eq!(name.separator(), ".");
        assert_eq!(name.to_string(), "sales.orders");
    }

    #[test]
    fn test_quoted_name_with_dot_has_no_schema() {
        let name = SchemaQualifiedName::new("\"random.table\"");
        assert_eq!(name.schema(), "");
        assert_eq!(name.object(), "\"random.table\"");
        assert!(!name.has_schema());
    }

    #[test]
    fn test_quoted_parts() {
        let name = SchemaQualifiedName::new("\"my.schema\".\"my.table\"");
        assert_eq!(name.schema(), "\"my.schema\"");
        assert_eq!(name.object(), "\"my.table\"");

        let name = SchemaQualifiedName::new("sales.\"q1.totals\"");
        assert_eq!(name.schema(), "sales");
        assert_eq!(name.object(), "\"q1.totals\"");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let name = SchemaQualifiedName::new("a.b.c");
        assert_eq!(name.schema(), "a");
        assert_eq!(name.object(), "b.c");
        assert_eq!(name.schema(), "a");
        assert_eq!(name.object(), "b.c");
        assert_eq!(name.as_str(), "a.b.c");
    }
}
