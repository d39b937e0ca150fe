use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::config;
use crate::database::manager::DatabaseError;
use crate::database::params::bind_params_as;
use crate::sql::{sql_for_partial_update, ColumnMap, FieldUpdateSet};

const COLUMNS: &str = "username, first_name, last_name, email, is_admin";

/// Request field names that differ from their column
pub const COLUMN_MAP: ColumnMap<'static> = ColumnMap(&[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(FromRow)]
struct UserWithPassword {
    #[sqlx(flatten)]
    user: User,
    password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    /// Check a username/password pair. Unknown users and wrong passwords
    /// produce the same error.
    pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<User, DatabaseError> {
        let sql = format!("SELECT {}, password FROM users WHERE username = $1", COLUMNS);
        let row = sqlx::query_as::<_, UserWithPassword>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?;

        let Some(row) = row else {
            return Err(DatabaseError::InvalidCredentials);
        };

        if verify_password(password.to_string(), row.password).await? {
            Ok(row.user)
        } else {
            Err(DatabaseError::InvalidCredentials)
        }
    }

    /// Insert a user with a hashed password. A taken username is a `Duplicate`.
    pub async fn register(pool: &PgPool, data: &NewUser) -> Result<User, DatabaseError> {
        let duplicate: Option<(String,)> = sqlx::query_as("SELECT username FROM users WHERE username = $1")
            .bind(&data.username)
            .fetch_optional(pool)
            .await?;
        if duplicate.is_some() {
            return Err(DatabaseError::Duplicate(format!("Duplicate username: {}", data.username)));
        }

        let hashed = hash_password(data.password.clone()).await?;
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&data.username)
            .bind(&hashed)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.email)
            .bind(data.is_admin)
            .fetch_one(pool)
            .await?;

        tracing::info!("Registered user {} (admin: {})", user.username, user.is_admin);
        Ok(user)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, username: &str) -> Result<User, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
    }

    /// Partial update. A `password` field is hashed before it is stored.
    pub async fn update(pool: &PgPool, username: &str, data: &FieldUpdateSet) -> Result<User, DatabaseError> {
        let mut data = data.clone();
        if let Some(Value::String(password)) = data.get("password").cloned() {
            data.insert("password".to_string(), Value::String(hash_password(password).await?));
        }

        let set = sql_for_partial_update(&data, COLUMN_MAP)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = {} RETURNING {}",
            set.set_cols,
            set.next_placeholder(),
            COLUMNS
        );

        bind_params_as(sqlx::query_as::<_, User>(&sql), &set.values)
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
    }

    pub async fn remove(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
        let deleted: Option<(String,)> = sqlx::query_as("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        match deleted {
            Some(_) => {
                tracing::info!("Deleted user {}", username);
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("No user: {}", username))),
        }
    }
}

// bcrypt is CPU-bound; keep it off the async workers
async fn hash_password(password: String) -> Result<String, DatabaseError> {
    let cost = config::config().security.bcrypt_work_factor;
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| DatabaseError::PasswordHash(e.to_string()))?
        .map_err(DatabaseError::from)
}

async fn verify_password(password: String, hash: String) -> Result<bool, DatabaseError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| DatabaseError::PasswordHash(e.to_string()))?
        .map_err(DatabaseError::from)
}
