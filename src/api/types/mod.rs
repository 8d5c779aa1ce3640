//! Request/response types shared by the handlers

pub mod error;
pub mod extract;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use extract::{Json, Path};
