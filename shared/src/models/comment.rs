//! Comment Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lead::LeadId;
use super::user::{UserId, UserSummary};

pub type CommentId = i64;

/// Comment on a lead
///
/// A comment may reply to at most one other comment on the same lead.
/// Replies are a single level deep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub lead_id: LeadId,
    pub content: String,
    pub user: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, alias = "replyToId", skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<CommentId>,
}

impl Comment {
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.user.id == user_id
    }

    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }
}
