//! Task domain

mod entity;
mod repository;

pub use entity::{
    task_permissions, Task, TaskId, MAX_TITLE_LENGTH, TASK_CREATE, TASK_DELETE, TASK_UPDATE,
};
pub use repository::TaskRepository;
#[cfg(test)]
pub use repository::MockTaskRepository;
