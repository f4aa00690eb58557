//! Shared types for CityFix
//!
//! Common types used by the server and the client SDK: domain models, the
//! issue workflow rules, error codes and response structures.

pub mod error;
pub mod issue;
pub mod models;
pub mod payment;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
