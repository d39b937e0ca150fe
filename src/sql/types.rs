use serde_json::{Map, Value};

/// Logical field name to new value, in the order the caller supplied them.
///
/// `serde_json` is built with `preserve_order`, so iteration follows
/// insertion order and placeholder numbering is stable.
pub type FieldUpdateSet = Map<String, Value>;

/// Logical field name to physical column name.
///
/// Names without an entry are used as the column name unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap<'a>(pub &'a [(&'a str, &'a str)]);

impl<'a> ColumnMap<'a> {
    pub const EMPTY: ColumnMap<'static> = ColumnMap(&[]);

    pub fn column<'k>(&self, field: &'k str) -> &'k str
    where
        'a: 'k,
    {
        self.0
            .iter()
            .find(|(logical, _)| *logical == field)
            .map(|(_, column)| *column)
            .unwrap_or(field)
    }
}

/// `SET` clause body and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    /// `"first_name"=$1, "is_admin"=$2`
    pub set_cols: String,
    /// `values[i - 1]` binds to `$i`
    pub values: Vec<Value>,
}

impl SetClause {
    /// Placeholder for the first parameter after the SET values, e.g. the
    /// key in a trailing `WHERE handle = $n`.
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.values.len() + 1)
    }
}

/// `WHERE` clause and its positional parameters. Empty when no filter applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    pub clause: String,
    pub values: Vec<Value>,
}

impl WhereClause {
    /// The "no filter" result: no clause text, no values.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}
