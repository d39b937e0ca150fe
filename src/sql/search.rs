use serde::Deserialize;
use serde_json::Value;

use super::error::SqlError;
use super::types::WhereClause;

/// Filters accepted by `GET /companies`.
///
/// Bounds arrive as query-string text and are coerced to integers by
/// [`sql_for_company_search`]. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanySearch {
    #[serde(rename = "nameLike")]
    pub name_like: Option<String>,
    #[serde(rename = "minEmployees", alias = "minBound")]
    pub min_employees: Option<String>,
    #[serde(rename = "maxEmployees", alias = "maxBound")]
    pub max_employees: Option<String>,
}

/// Build the `WHERE` clause for a company search.
///
/// Bounds are checked before anything is built. Terms are emitted in a fixed
/// order (name, minimum, maximum) and each takes the next placeholder, so
/// absent terms leave no gaps in the numbering.
pub fn sql_for_company_search(query: &CompanySearch) -> Result<WhereClause, SqlError> {
    let min = coerce_bound("minEmployees", query.min_employees.as_deref())?;
    let max = coerce_bound("maxEmployees", query.max_employees.as_deref())?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(SqlError::MinExceedsMax { min, max });
        }
    }

    let name = present(query.name_like.as_deref());

    let terms: [(&str, Option<Value>); 3] = [
        ("name ILIKE", name.map(|n| Value::from(format!("%{}%", n)))),
        ("num_employees >=", min.map(Value::from)),
        ("num_employees <=", max.map(Value::from)),
    ];

    let mut search = SearchWhere::default();
    for (expression, value) in terms {
        if let Some(value) = value {
            search.push(expression, value);
        }
    }

    Ok(search.finish())
}

#[derive(Default)]
struct SearchWhere {
    expressions: Vec<String>,
    values: Vec<Value>,
}

impl SearchWhere {
    fn push(&mut self, expression: &str, value: Value) {
        let placeholder = self.param(value);
        self.expressions.push(format!("{} {}", expression, placeholder));
    }

    fn param(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }

    fn finish(self) -> WhereClause {
        if self.expressions.is_empty() {
            return WhereClause::none();
        }
        WhereClause {
            clause: format!("WHERE {}", self.expressions.join(" AND ")),
            values: self.values,
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn coerce_bound(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, SqlError> {
    match present(raw) {
        None => Ok(None),
        Some(text) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| SqlError::InvalidNumber {
                field,
                value: text.to_string(),
            }),
    }
}
