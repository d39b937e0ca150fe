use std::time::Duration;

use once_cell::sync::OnceCell;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config;
use crate::sql::SqlError;

/// Errors from the database layer and the models built on it
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("Invalid username/password")]
    InvalidCredentials,

    #[error(transparent)]
    InvalidInput(#[from] SqlError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<bcrypt::BcryptError> for DatabaseError {
    fn from(err: bcrypt::BcryptError) -> Self {
        DatabaseError::PasswordHash(err.to_string())
    }
}

/// Owner of the process-wide connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Shared pool, created on first use.
    ///
    /// The pool connects lazily so the server can start (and answer
    /// `/health` with 503) while the database is down.
    pub fn pool() -> Result<PgPool, DatabaseError> {
        static POOL: OnceCell<PgPool> = OnceCell::new();
        POOL.get_or_try_init(|| {
            let db = &config::config().database;
            let pool = PgPoolOptions::new()
                .max_connections(db.max_connections)
                .acquire_timeout(Duration::from_secs(db.connection_timeout))
                .connect_lazy(&db.url)?;
            info!("Created database pool for: {}", Self::redacted_url(&db.url));
            Ok::<_, DatabaseError>(pool)
        })
        .cloned()
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool()?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool on shutdown if it was ever opened
    pub async fn close() {
        if let Ok(pool) = Self::pool() {
            pool.close().await;
            info!("Closed database pool");
        }
    }

    /// Connection string with any password removed, for logs
    fn redacted_url(raw: &str) -> String {
        match url::Url::parse(raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.into()
            }
            Err(_) => "<unparseable DATABASE_URL>".to_string(),
        }
    }
}
