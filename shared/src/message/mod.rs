//! Push channel message types
//!
//! The push channel is a WebSocket carrying JSON text frames. Clients send
//! [`ClientMessage`] to join or leave a lead's room; the server sends a
//! [`CommentEvent`] to every member of the room the comment belongs to.

use serde::{Deserialize, Serialize};

use crate::models::{Comment, CommentId, LeadId};

/// Room join/leave payload
///
/// Rooms group subscribers by lead id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub lead_id: LeadId,
}

/// Client -> push server
///
/// Wire shape: `{"type": "joinRoom", "leadId": 7}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinRoom(RoomPayload),
    LeaveRoom(RoomPayload),
}

impl ClientMessage {
    pub fn join_room(lead_id: LeadId) -> Self {
        Self::JoinRoom(RoomPayload { lead_id })
    }

    pub fn leave_room(lead_id: LeadId) -> Self {
        Self::LeaveRoom(RoomPayload { lead_id })
    }

    pub fn lead_id(&self) -> LeadId {
        match self {
            Self::JoinRoom(room) | Self::LeaveRoom(room) => room.lead_id,
        }
    }
}

/// Removal notice for one comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDeleted {
    pub lead_id: LeadId,
    pub comment_id: CommentId,
}

/// Comment event pushed to every member of a lead's room
///
/// Wire shape: `{"event": "leadCommentAdded", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum CommentEvent {
    LeadCommentAdded(Comment),
    LeadCommentEdited(Comment),
    LeadCommentDeleted(CommentDeleted),
}

impl CommentEvent {
    /// Lead the event belongs to, used for room-membership filtering
    pub fn lead_id(&self) -> LeadId {
        match self {
            Self::LeadCommentAdded(c) | Self::LeadCommentEdited(c) => c.lead_id,
            Self::LeadCommentDeleted(d) => d.lead_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LeadCommentAdded(_) => "leadCommentAdded",
            Self::LeadCommentEdited(_) => "leadCommentEdited",
            Self::LeadCommentDeleted(_) => "leadCommentDeleted",
        }
    }
}
