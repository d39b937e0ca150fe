use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::params::{bind_params_as, bind_update_as};
use crate::sql::{sql_for_partial_update, ColumnMap, FieldUpdateSet, WhereClause};

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// Nullable INTEGER columns, by request field name
const INTEGER_FIELDS: &[&str] = &["numEmployees"];

/// Request field names that differ from their column
pub const COLUMN_MAP: ColumnMap<'static> = ColumnMap(&[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl Company {
    /// Insert a company. A handle that already exists is a `Duplicate`.
    pub async fn create(pool: &PgPool, data: &NewCompany) -> Result<Company, DatabaseError> {
        let duplicate: Option<(String,)> = sqlx::query_as("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.handle)
            .fetch_optional(pool)
            .await?;
        if duplicate.is_some() {
            return Err(DatabaseError::Duplicate(format!("Duplicate company: {}", data.handle)));
        }

        let sql = format!(
            "INSERT INTO companies ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
            cols = COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(pool)
            .await?;

        tracing::info!("Created company {}", company.handle);
        Ok(company)
    }

    /// All companies matching `filter`, ordered by name.
    pub async fn find_all(pool: &PgPool, filter: &WhereClause) -> Result<Vec<Company>, DatabaseError> {
        let sql = if filter.is_empty() {
            format!("SELECT {} FROM companies ORDER BY name", COLUMNS)
        } else {
            format!("SELECT {} FROM companies {} ORDER BY name", COLUMNS, filter.clause)
        };

        let companies = bind_params_as(sqlx::query_as::<_, Company>(&sql), &filter.values)
            .fetch_all(pool)
            .await?;
        Ok(companies)
    }

    pub async fn get(pool: &PgPool, handle: &str) -> Result<Company, DatabaseError> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COLUMNS);
        sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    /// Partial update: only the fields present in `data` change.
    pub async fn update(pool: &PgPool, handle: &str, data: &FieldUpdateSet) -> Result<Company, DatabaseError> {
        let set = sql_for_partial_update(data, COLUMN_MAP)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = {} RETURNING {}",
            set.set_cols,
            set.next_placeholder(),
            COLUMNS
        );

        bind_update_as(sqlx::query_as::<_, Company>(&sql), data.keys(), &set.values, INTEGER_FIELDS)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), DatabaseError> {
        let deleted: Option<(String,)> = sqlx::query_as("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await?;

        match deleted {
            Some(_) => {
                tracing::info!("Deleted company {}", handle);
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("No company: {}", handle))),
        }
    }
}
