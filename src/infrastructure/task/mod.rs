//! Task infrastructure implementations

mod sqlite_repository;

pub use sqlite_repository::SqliteTaskRepository;
