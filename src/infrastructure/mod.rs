//! Infrastructure layer - storage, credentials and logging implementations

pub mod api_key;
pub mod logging;
pub mod storage;
pub mod task;
