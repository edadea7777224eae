//! Error codes shared with the lead backend
//!
//! - [`ErrorCode`]: standardized error codes
//! - [`ApiError`]: structured error parsed from backend error bodies
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Lead errors
//! - 5xxx: Comment errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiError, ErrorCode};
//! use shared::http::StatusCode;
//!
//! let err = ApiError::from_response(StatusCode::FORBIDDEN, r#"{"code":2004,"message":"no"}"#);
//! assert_eq!(err.code, ErrorCode::AssignedBySuperAdmin);
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::ApiError;
