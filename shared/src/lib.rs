//! Shared types for Leadline
//!
//! Wire models, request/response DTOs, error codes and push-channel message
//! types used by the lead backend and its clients.

pub mod client;
pub mod error;
pub mod message;
pub mod models;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

// Push channel re-exports (for convenient access)
pub use message::{ClientMessage, CommentEvent};

pub use error::{ApiError, ErrorCode};
