//! Task entity

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, PermissionName};

/// Maximum length of a task title in characters
pub const MAX_TITLE_LENGTH: usize = 500;

/// Permission guarding task creation
pub const TASK_CREATE: &str = "task.create";
/// Permission guarding completion changes
pub const TASK_UPDATE: &str = "task.update";
/// Permission guarding task deletion
pub const TASK_DELETE: &str = "task.delete";

/// Permissions the task routes require, created at startup
pub fn task_permissions() -> [PermissionName; 3] {
    [
        PermissionName::from_static(TASK_CREATE),
        PermissionName::from_static(TASK_UPDATE),
        PermissionName::from_static(TASK_DELETE),
    ]
}

/// Store-assigned task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
}

impl Task {
    /// Trim and validate a title before it is stored
    pub fn normalize_title(title: &str) -> Result<String, DomainError> {
        let title = title.trim();

        if title.is_empty() {
            return Err(DomainError::validation("Task title cannot be empty"));
        }

        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(format!(
                "Task title exceeds maximum length of {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        Ok(title.to_string())
    }
}
