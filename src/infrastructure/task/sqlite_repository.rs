//! SQLite task repository

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::task::{Task, TaskId, TaskRepository};
use crate::domain::DomainError;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT 0
    )
"#;

/// SQLite implementation of TaskRepository
#[derive(Debug, Clone)]
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn initialize_schema(&self) -> Result<(), DomainError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create tasks table: {}", e)))?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        sqlx::query("SELECT 1 FROM tasks LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Task store health check failed: {}", e)))?;

        Ok(true)
    }

    async fn create(&self, title: &str) -> Result<Task, DomainError> {
        let id: i64 =
            sqlx::query_scalar("INSERT INTO tasks (title, completed) VALUES (?, 0) RETURNING id")
                .bind(title)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to create task: {}", e)))?;

        Ok(Task {
            id: TaskId::new(id),
            title: title.to_string(),
            completed: false,
        })
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>, DomainError> {
        let row = sqlx::query("SELECT id, title, completed FROM tasks WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get task: {}", e)))?;

        row.as_ref().map(row_to_task).transpose()
    }

    async fn list(&self) -> Result<Vec<Task>, DomainError> {
        let rows = sqlx::query("SELECT id, title, completed FROM tasks ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list tasks: {}", e)))?;

        rows.iter().map(row_to_task).collect()
    }

    async fn set_completed(&self, id: TaskId, completed: bool) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE tasks SET completed = ? WHERE id = ?")
            .bind(completed)
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update task: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: TaskId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete task: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_task(row: &SqliteRow) -> Result<Task, DomainError> {
    Ok(Task {
        id: TaskId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        completed: row.try_get("completed")?,
    })
}
