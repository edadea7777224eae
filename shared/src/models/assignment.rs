//! Assignment Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lead::LeadId;
use super::user::{UserId, UserSummary};

/// Confirmed assignment of one lead, as recorded locally after the server accepts it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub lead_id: LeadId,
    pub assignees: Vec<UserSummary>,
    pub assigned_by: UserSummary,
    pub assigned_at: DateTime<Utc>,
}

impl Assignment {
    pub fn assignee_ids(&self) -> Vec<UserId> {
        self.assignees.iter().map(|u| u.id).collect()
    }
}
