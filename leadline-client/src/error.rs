//! Client error types

use http::StatusCode;
use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

use crate::message::PushError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required (no token, or the server rejected it)
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (local or HTTP 400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Structured API error with a backend error code
    #[error("API error {code}: {message}")]
    Api { code: ErrorCode, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Push channel error
    #[error("Push channel error: {0}")]
    Push(#[from] PushError),
}

/// Coarse classification used by callers to pick a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, fix and resubmit
    Validation,
    /// Lead already assigned by a super admin; admins may request reassignment
    Permission,
    /// Session is gone; log in again
    Auth,
    /// Transport, timeout or server failure
    Network,
}

impl ClientError {
    /// Map a non-success HTTP response to an error
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let api = ApiError::from_response(status, body);

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(api.message)
            }
            // Only an explicit code distinguishes this from other 403 causes
            _ if api.code == ErrorCode::AssignedBySuperAdmin => ClientError::Api {
                code: api.code,
                message: api.message,
            },
            StatusCode::FORBIDDEN => ClientError::Forbidden(api.message),
            StatusCode::NOT_FOUND => ClientError::NotFound(api.message),
            _ => ClientError::Api {
                code: api.code,
                message: api.message,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Unauthorized => ErrorKind::Auth,
            ClientError::Api { code, .. } => match code {
                ErrorCode::AssignedBySuperAdmin => ErrorKind::Permission,
                ErrorCode::ValidationFailed | ErrorCode::InvalidRequest => ErrorKind::Validation,
                ErrorCode::NotAuthenticated
                | ErrorCode::TokenExpired
                | ErrorCode::TokenInvalid
                | ErrorCode::SessionExpired => ErrorKind::Auth,
                _ => ErrorKind::Network,
            },
            _ => ErrorKind::Network,
        }
    }

    /// Whether repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// The distinguishable "already assigned by super admin" rejection
    pub fn is_assigned_by_super_admin(&self) -> bool {
        matches!(
            self,
            ClientError::Api {
                code: ErrorCode::AssignedBySuperAdmin,
                ..
            }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Http(err)
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        ClientError::Validation(messages.join("; "))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
