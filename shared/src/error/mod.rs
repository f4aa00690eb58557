//! Error codes and the JSON error body shared by server and client
//!
//! The server turns every [`AppError`] into an HTTP status plus an
//! [`ApiResponse`] body; the client reads the numeric code back with
//! [`ApiResponse::error_code`] and decides how to react by [`ErrorCategory`].
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::InvalidTransition)
//!     .with_detail("from", "Pending")
//!     .with_detail("to", "Working");
//!
//! let body = ApiResponse::<()>::error(&err);
//! assert_eq!(body.code, Some(4002));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
