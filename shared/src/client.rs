//! Request/response DTOs for the lead backend's REST API
//!
//! Entity payloads live in [`crate::models`]; this module only holds the
//! small wrapper bodies that exist for one endpoint each.

use serde::{Deserialize, Serialize};

use crate::models::{CommentId, LeadId, LeadStatus, User, UserId};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request (`POST /auth/login`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

// =============================================================================
// Lead API DTOs
// =============================================================================

/// Status-only update (`PATCH /leads/{id}/status`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: LeadStatus,
}

// =============================================================================
// Assignment API DTOs
// =============================================================================

/// Single-lead assignment or reassignment request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub assignee_ids: Vec<UserId>,
}

/// Bulk assignment (`POST /assigns/bulk-assign`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignRequest {
    pub lead_ids: Vec<LeadId>,
    pub assignee_ids: Vec<UserId>,
}

// =============================================================================
// Comment API DTOs
// =============================================================================

/// New comment (`POST /comments/{leadId}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreate {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<CommentId>,
}

/// Comment edit (`PATCH /comments/{leadId}/{commentId}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentUpdate {
    pub content: String,
}
