//! Leadline Client - lead management client for the Leadline backend
//!
//! REST calls go through [`LeadApi`]; live comment updates arrive over the
//! push WebSocket in [`message`]. Lead state lives in a [`LeadStore`] that
//! only changes after the server confirms.

pub mod assignment;
pub mod client;
pub mod comments;
pub mod config;
pub mod error;
pub mod leads;
pub mod message;
pub mod session;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorKind};
pub use session::Session;

pub use client::{HttpClient, LeadApi, NetworkHttpClient};

pub use assignment::{AssignError, AssignState, AssignmentCoordinator};
pub use comments::{CommentSync, CommentThread};
pub use leads::{LeadQuery, LeadScope, LeadService, LeadSort, LeadStore, Page, Paginator};

// Push connection
pub use message::{PushClient, PushConfig, PushError, RoomSubscription};

// Re-export shared types for convenience
pub use shared::models;
pub use shared::{ClientMessage, CommentEvent, ErrorCode};
