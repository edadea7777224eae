//! Analytics Model
//!
//! Aggregates are computed by the backend; the client only displays them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Precomputed lead statistics for a date range (`GET /analytics`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSummary {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub total_leads: u64,
    pub new_leads: u64,
    pub in_progress_leads: u64,
    pub closed_leads: u64,
    pub by_source: Vec<SourceCount>,
    pub by_assignee: Vec<AssigneeCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssigneeCount {
    pub user_id: i64,
    pub name: String,
    pub open: u64,
    pub closed: u64,
}
