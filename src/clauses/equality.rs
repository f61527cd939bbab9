/// Pairwise column equality between two aliased row sources, e.g.
/// `src.a = tgt.a and src.b = tgt.b`.
#[derive(Debug, Clone)]
pub struct ColumnEquality<'a> {
    left: &'a str,
    right: &'a str,
    columns: Vec<&'a str>,
}

impl<'a> ColumnEquality<'a> {
    pub fn new(left: &'a str, right: &'a str, columns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            left,
            right,
            columns: columns.into_iter().collect(),
        }
    }

    /// Renders one `left.col = right.col` term per column joined by `separator`.
    pub fn build_sql(&self, separator: &str) -> String {
        self.columns
            .iter()
            .map(|c| format!("{}.{} = {}.{}", self.left, c, self.right, c))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_joined() {
        let eq = ColumnEquality::new("src", "tgt", ["a", "b"]);
        assert_eq!(eq.build_sql(" and "), "src.a = tgt.a and src.b = tgt.b");
    }

    #[test]
    fn test_comma_joined() {
        let eq = ColumnEquality::new("tgt", "src", ["c"]);
        assert_eq!(eq.build_sql(","), "tgt.c = src.c");
        assert_eq!(ColumnEquality::new("S", "T", []).build_sql(","), "");
    }
}
