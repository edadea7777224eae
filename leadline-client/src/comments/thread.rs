//! Per-lead comment list reducer
//!
//! Fetched history and push events arrive in any order and may repeat. The
//! reducer merges them by comment id, keeps the list ordered by creation
//! time (ties by id) and never lets an older copy overwrite a newer one.
//! Deleted ids are remembered so a late copy cannot bring a comment back.

use std::collections::HashSet;

use shared::message::CommentEvent;
use shared::models::{Comment, CommentId, LeadId};

#[derive(Debug, Clone, PartialEq)]
pub enum CommentAction {
    /// Full history fetch
    Loaded(Vec<Comment>),
    Added(Comment),
    Edited(Comment),
    Deleted(CommentId),
}

impl From<CommentEvent> for CommentAction {
    fn from(event: CommentEvent) -> Self {
        match event {
            CommentEvent::LeadCommentAdded(c) => CommentAction::Added(c),
            CommentEvent::LeadCommentEdited(c) => CommentAction::Edited(c),
            CommentEvent::LeadCommentDeleted(d) => CommentAction::Deleted(d.comment_id),
        }
    }
}

/// A top-level comment with its direct replies
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadEntry<'a> {
    pub comment: &'a Comment,
    pub replies: Vec<&'a Comment>,
}

#[derive(Debug, Clone)]
pub struct CommentThread {
    lead_id: LeadId,
    comments: Vec<Comment>,
    deleted: HashSet<CommentId>,
}

impl CommentThread {
    pub fn new(lead_id: LeadId) -> Self {
        Self {
            lead_id,
            comments: Vec::new(),
            deleted: HashSet::new(),
        }
    }

    pub fn lead_id(&self) -> LeadId {
        self.lead_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Apply an action; returns whether the list changed
    pub fn apply(&mut self, action: CommentAction) -> bool {
        match action {
            CommentAction::Loaded(fetched) => {
                let mut changed = false;
                for comment in fetched {
                    changed |= self.upsert(comment);
                }
                changed
            }
            CommentAction::Added(comment) => self.upsert(comment),
            CommentAction::Edited(comment) => {
                if comment.lead_id != self.lead_id {
                    return false;
                }
                match self.position(comment.id) {
                    Some(index) => self.replace(index, comment),
                    None => false,
                }
            }
            CommentAction::Deleted(id) => {
                self.deleted.insert(id);
                match self.position(id) {
                    Some(index) => {
                        self.comments.remove(index);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    fn position(&self, id: CommentId) -> Option<usize> {
        self.comments.iter().position(|c| c.id == id)
    }

    /// Insert in creation order, or treat as an edit when the id is known
    fn upsert(&mut self, comment: Comment) -> bool {
        if comment.lead_id != self.lead_id || self.deleted.contains(&comment.id) {
            return false;
        }
        if let Some(index) = self.position(comment.id) {
            return self.replace(index, comment);
        }
        let key = (comment.created_at, comment.id);
        let at = self
            .comments
            .partition_point(|c| (c.created_at, c.id) < key);
        self.comments.insert(at, comment);
        true
    }

    /// Replace content in place; position and `reply_to` stay as first seen
    fn replace(&mut self, index: usize, incoming: Comment) -> bool {
        let current = &mut self.comments[index];
        if incoming.updated_at < current.updated_at {
            return false;
        }
        if current.content == incoming.content
            && current.updated_at == incoming.updated_at
            && current.user == incoming.user
        {
            return false;
        }
        current.content = incoming.content;
        current.updated_at = incoming.updated_at;
        current.user = incoming.user;
        true
    }

    /// Group single-level replies under their parent
    ///
    /// A reply whose parent is missing, or whose parent is itself a reply,
    /// is shown at top level.
    pub fn threads(&self) -> Vec<ThreadEntry<'_>> {
        let is_root = |c: &Comment| match c.reply_to {
            None => true,
            Some(parent) => !matches!(self.get(parent), Some(p) if p.reply_to.is_none()),
        };

        let mut entries: Vec<ThreadEntry<'_>> = self
            .comments
            .iter()
            .filter(|c| is_root(c))
            .map(|comment| ThreadEntry {
                comment,
                replies: Vec::new(),
            })
            .collect();

        for reply in self.comments.iter().filter(|c| !is_root(c)) {
            if let Some(entry) = entries
                .iter_mut()
                .find(|e| Some(e.comment.id) == reply.reply_to)
            {
                entry.replies.push(reply);
            }
        }
        entries
    }
}
