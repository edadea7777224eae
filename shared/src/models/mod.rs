//! Data models shared with the lead backend
//!
//! All wire payloads are camelCase JSON.

pub mod analytics;
pub mod assignment;
pub mod comment;
pub mod description;
pub mod lead;
pub mod user;

pub use analytics::{AnalyticsSummary, AssigneeCount, SourceCount};
pub use assignment::Assignment;
pub use comment::{Comment, CommentId};
pub use description::{ContactKind, DescriptionDetail, LeadDescription};
pub use lead::{Lead, LeadId, LeadPatch, LeadStatus, NewLead, Priority};
pub use user::{Role, User, UserId, UserSummary};
