//! Structured API error carried in backend error bodies

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error reported by the backend
///
/// Wire shape: `{"code": 2004, "message": "...", "details": {...}}`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ApiError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

/// Loosely-typed body, used before the code is known to be one of ours
#[derive(Deserialize)]
struct RawErrorBody {
    code: Option<u16>,
    message: Option<String>,
    #[serde(default)]
    details: Option<HashMap<String, Value>>,
}

impl ApiError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Interpret a non-success response
    ///
    /// Structured bodies with a known code keep it. Unknown codes, plain-text
    /// bodies and empty bodies fall back to the code implied by the status.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let fallback = ErrorCode::from_http_status(status);

        match serde_json::from_str::<RawErrorBody>(body) {
            Ok(raw) => {
                let code = raw
                    .code
                    .and_then(|c| ErrorCode::try_from(c).ok())
                    .unwrap_or(fallback);
                let message = raw
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| code.message().to_string());
                Self {
                    code,
                    message,
                    details: raw.details,
                }
            }
            Err(_) if body.trim().is_empty() => Self::new(fallback),
            Err(_) => Self::with_message(fallback, body.trim()),
        }
    }
}
