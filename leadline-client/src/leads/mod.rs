//! Lead store, service and derived views
//!
//! The store is the single shared collection; filter and pagination are pure
//! functions over a snapshot of it.

pub mod filter;
pub mod pagination;
pub mod service;
pub mod store;

pub use filter::{Choice, LeadQuery, LeadSort};
pub use pagination::{DEFAULT_PAGE_SIZE, Page, Paginator};
pub use service::LeadService;
pub use store::{LeadAction, LeadStore, PatchOutcome, Ticket};

use shared::models::Role;

/// Which leads a session may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadScope {
    /// Every lead (`GET /leads`)
    All,
    /// Leads assigned to the current user (`GET /leads/my-leads`)
    Mine,
}

impl LeadScope {
    pub fn for_role(role: Role) -> Self {
        if role.sees_all_leads() {
            LeadScope::All
        } else {
            LeadScope::Mine
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            LeadScope::All => "/leads",
            LeadScope::Mine => "/leads/my-leads",
        }
    }
}
