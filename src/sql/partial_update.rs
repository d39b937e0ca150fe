use super::error::SqlError;
use super::types::{ColumnMap, FieldUpdateSet, SetClause};

/// Build the body of an `UPDATE ... SET` from the fields being changed.
///
/// Each field becomes `"<column>"=$<i>` with `columns` translating the
/// logical name. Values are returned separately for binding and are never
/// written into the SQL text.
///
/// ```text
/// {firstName: "Bob", isAdmin: true} + {firstName: first_name, isAdmin: is_admin}
///   => "first_name"=$1, "is_admin"=$2   ["Bob", true]
/// ```
pub fn sql_for_partial_update(data: &FieldUpdateSet, columns: ColumnMap<'_>) -> Result<SetClause, SqlError> {
    if data.is_empty() {
        return Err(SqlError::NoData);
    }

    let mut cols = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());
    for (idx, (field, value)) in data.iter().enumerate() {
        cols.push(format!("\"{}\"=${}", columns.column(field), idx + 1));
        values.push(value.clone());
    }

    Ok(SetClause {
        set_cols: cols.join(", "),
        values,
    })
}
