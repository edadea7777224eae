//! Client module - REST transport and typed API.

pub mod api;
pub mod http;

// Re-export main types
pub use api::LeadApi;
pub use http::{HttpClient, NetworkHttpClient};
