//! SQLite database adapters for pollwise.

pub mod connection;
pub mod guide_repository;
pub mod migrations;
pub mod response_repository;
pub mod tail_repository;
pub mod vote_repository;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use guide_repository::SqliteGuideRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use response_repository::SqliteResponseRepository;
pub use tail_repository::SqliteTailRepository;
pub use vote_repository::SqliteVoteRepository;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Category, ClosureType, DatabaseConfig};

/// Parse a UUID string from a SQLite row field.
pub fn parse_uuid(s: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional RFC3339 datetime string from a SQLite row field.
pub fn parse_optional_datetime(s: Option<String>) -> DomainResult<Option<DateTime<Utc>>> {
    s.map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse a `YYYY-MM-DD` date from a SQLite row field.
pub fn parse_date(s: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse a category column. Unknown values are rejected rather than defaulted.
pub fn parse_category(s: &str) -> DomainResult<Category> {
    Category::from_str(s).ok_or_else(|| DomainError::SerializationError(format!("unknown category: {s}")))
}

pub fn parse_closure_type(s: &str) -> DomainResult<ClosureType> {
    ClosureType::from_str(s)
        .ok_or_else(|| DomainError::SerializationError(format!("unknown closure type: {s}")))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(&config.url(), Some(PoolConfig::from(config))).await?;
    let migrator = Migrator::new(pool.clone());
    let applied = migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    if applied > 0 {
        tracing::info!(applied, path = %config.path, "database migrated");
    }
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
