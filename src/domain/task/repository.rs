//! Task repository trait

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::entity::{Task, TaskId};
use crate::domain::DomainError;

/// Repository trait for task storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create backing tables if absent
    async fn initialize_schema(&self) -> Result<(), DomainError>;

    /// Constant-cost check that the tasks table is reachable
    async fn health_check(&self) -> Result<bool, DomainError>;

    /// Insert a new, uncompleted task
    async fn create(&self, title: &str) -> Result<Task, DomainError>;

    /// Get a task by id
    async fn get(&self, id: TaskId) -> Result<Option<Task>, DomainError>;

    /// List all tasks ordered by id
    async fn list(&self) -> Result<Vec<Task>, DomainError>;

    /// Set the completion flag; returns false if the task does not exist
    async fn set_completed(&self, id: TaskId, completed: bool) -> Result<bool, DomainError>;

    /// Delete a task; returns false if the task does not exist
    async fn delete(&self, id: TaskId) -> Result<bool, DomainError>;
}
