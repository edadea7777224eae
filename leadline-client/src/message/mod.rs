// leadline-client/src/message/mod.rs
// Push channel - client configuration and error types

pub mod client;

pub use client::{PushClient, RoomSubscription};
pub use shared::message::{ClientMessage, CommentEvent};

use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Push channel error
#[derive(Debug, Error)]
pub enum PushError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server refused the upgrade with 401 or 403
    #[error("Push channel rejected the session (HTTP {0})")]
    Unauthorized(u16),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// The channel was closed by either side
    #[error("Push channel closed")]
    Closed,
}

impl From<serde_json::Error> for PushError {
    fn from(err: serde_json::Error) -> Self {
        PushError::InvalidMessage(err.to_string())
    }
}

/// Push client configuration
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Timeout for the WebSocket handshake
    pub connect_timeout: Duration,
    /// Interval between keep-alive pings
    pub ping_interval: Duration,
    /// Event bus capacity; slow subscribers beyond this lag and skip events
    pub event_capacity: usize,
    /// Sent as the `User-Agent` of the upgrade request
    pub client_name: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(30),
            event_capacity: 1024,
            client_name: "leadline-client".to_string(),
        }
    }
}

impl PushConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the keep-alive interval; zero is raised to one second
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval.max(Duration::from_secs(1));
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }
}
