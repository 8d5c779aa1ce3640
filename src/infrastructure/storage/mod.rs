//! Storage infrastructure - SQLite connection pool

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::StorageConfig;
use crate::domain::DomainError;

/// Open a connection pool for the configured database
pub async fn connect(config: &StorageConfig) -> Result<SqlitePool, DomainError> {
    let in_memory = is_in_memory(&config.database_url);

    let mut options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| DomainError::storage(format!("Invalid database url: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DomainError::storage(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
    }

    // Every connection to `:memory:` is a separate database
    let max_connections = if in_memory { 1 } else { config.max_connections };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(600)) })
        .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
        .connect_with(options)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to database: {}", e)))?;

    info!(max_connections, in_memory, "Database connection established");

    Ok(pool)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Single-connection in-memory pool
#[cfg(test)]
pub async fn memory_pool() -> Result<SqlitePool, DomainError> {
    connect(&StorageConfig {
        database_url: "sqlite::memory:".to_string(),
        ..StorageConfig::default()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:auth?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://data/taskgate.db"));
    }

    #[tokio::test]
    async fn test_memory_pool_connects() {
        let pool = memory_pool().await.unwrap();
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one, 1);
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("auth.db");
        let config = StorageConfig {
            database_url: format!("sqlite://{}", path.display()),
            ..StorageConfig::default()
        };

        connect(&config).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_invalid_url_is_storage_error() {
        let config = StorageConfig {
            database_url: "postgres://nope".to_string(),
            ..StorageConfig::default()
        };

        let result = connect(&config).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
