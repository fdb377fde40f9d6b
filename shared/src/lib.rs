//! Shared types for the seller platform
//!
//! Common types used across crates: the unified error-code system,
//! structured application errors, and the API response envelope.

pub mod error;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
