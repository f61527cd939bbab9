use crate::types::BindStyle;

/// Where bind numbering starts for the first value of the first row.
/// Row `r`, column `c` of a `k`-column batch gets index `r * k + c + base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindNumbering {
    /// `1..=n*k`, one counter across the whole statement.
    OneBased,
    /// `0..n*k`, computed from the row's position in the batch.
    ZeroBased,
}

impl BindNumbering {
    fn base(self) -> usize {
        match self {
            BindNumbering::OneBased => 1,
            BindNumbering::ZeroBased => 0,
        }
    }
}

/// Renders the bind placeholders for a batch of rows.
#[derive(Debug, Clone, Copy)]
pub struct BindRows<'a> {
    columns: &'a [&'a str],
    style: BindStyle,
    numbering: BindNumbering,
}

impl<'a> BindRows<'a> {
    pub fn new(columns: &'a [&'a str], style: BindStyle, numbering: BindNumbering) -> Self {
        Self {
            columns,
            style,
            numbering,
        }
    }

    fn placeholders(&self, row: usize) -> impl Iterator<Item = String> + '_ {
        let width = self.columns.len();
        let base = self.numbering.base();
        (0..width).map(move |c| self.style.placeholder(row * width + c + base))
    }

    /// `( :1,:2 ),( :3,:4 )` for an INSERT ... VALUES list.
    pub fn values_tuples(&self, rows: usize) -> String {
        (0..rows)
            .map(|r| format!("( {} )", self.placeholders(r).collect::<Vec<_>>().join(",")))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `select :1 as a,:2 as b union all select :3,:4`.
    ///
    /// Column aliases are only written on the first row; `suffix` (e.g.
    /// ` from dual`) is appended to every select.
    pub fn select_union(&self, rows: usize, suffix: &str) -> String {
        (0..rows)
            .map(|r| {
                let binds: Vec<String> = if r == 0 {
                    self.placeholders(r)
                        .zip(self.columns.iter())
                        .map(|(bind, col)| format!("{} as {}", bind, col))
                        .collect()
                } else {
                    self.placeholders(r).collect()
                };
                format!("select {}{}", binds.join(","), suffix)
            })
            .collect::<Vec<_>>()
            .join(" union all ")
    }
}
