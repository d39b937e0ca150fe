//! Positional binding of JSON values: `values[i - 1]` binds to `$i`.

use serde_json::Value;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    FromRow, Postgres,
};

pub fn bind_params_as<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    values: &'q [Value],
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for v in values {
        q = bind_value(q, v);
    }
    q
}

/// Bind the values of a partial update. `fields` are the update's field names
/// in the same order as `values`; a `null` for one of `integer_fields` is
/// bound as an INT NULL, since a text NULL is not assignable to an integer
/// column.
pub fn bind_update_as<'q, 'f, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    fields: impl IntoIterator<Item = &'f String>,
    values: &'q [Value],
    integer_fields: &[&str],
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for (field, v) in fields.into_iter().zip(values) {
        q = match v {
            Value::Null if integer_fields.contains(&field.as_str()) => q.bind(None::<i32>),
            _ => bind_value(q, v),
        };
    }
    q
}

fn bind_value<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q Value,
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => q.bind(None::<String>),
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}
