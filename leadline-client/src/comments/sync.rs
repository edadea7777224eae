//! Live comment view for one lead
//!
//! Opening joins the lead's push room, starts the history fetch and spawns
//! a consumer that folds push events into the shared thread. Both feed the
//! same [`CommentThread`] reducer, so their relative order does not matter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shared::client::CommentCreate;
use shared::models::{Comment, CommentId, Lead, LeadId, UserId};

use super::thread::{CommentAction, CommentThread};
use crate::client::{HttpClient, LeadApi, NetworkHttpClient};
use crate::error::{ClientError, ClientResult};
use crate::message::{PushClient, RoomSubscription};

type SharedThread = Arc<Mutex<CommentThread>>;

fn lock(thread: &Mutex<CommentThread>) -> MutexGuard<'_, CommentThread> {
    thread.lock().unwrap_or_else(|e| e.into_inner())
}

/// Fold one action into the thread and bump the change counter
fn apply(thread: &Mutex<CommentThread>, version: &watch::Sender<u64>, action: CommentAction) {
    if lock(thread).apply(action) {
        version.send_modify(|v| *v += 1);
    }
}

pub struct CommentSync<H: HttpClient = NetworkHttpClient> {
    lead_id: LeadId,
    user_id: UserId,
    can_post: bool,
    api: LeadApi<H>,
    thread: SharedThread,
    version: Arc<watch::Sender<u64>>,
    live: Arc<AtomicBool>,
    cancel: CancellationToken,
    fetch: Option<JoinHandle<ClientResult<usize>>>,
    consumer: Option<JoinHandle<()>>,
}

impl<H: HttpClient + 'static> CommentSync<H> {
    /// Join the lead's room and start loading its history
    ///
    /// Posting rights are decided here from the lead's assignee list and
    /// are not re-evaluated while the view is open.
    pub async fn open(api: LeadApi<H>, push: &PushClient, lead: &Lead) -> ClientResult<Self> {
        let user = api.session().require_user()?;
        let lead_id = lead.id;
        let room = push.join_room(lead_id)?;

        let thread: SharedThread = Arc::new(Mutex::new(CommentThread::new(lead_id)));
        let (version, _) = watch::channel(0u64);
        let version = Arc::new(version);
        let live = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();

        let consumer = tokio::spawn(consume(
            room,
            thread.clone(),
            version.clone(),
            live.clone(),
            cancel.clone(),
        ));
        let fetch = tokio::spawn(fetch_history(
            api.clone(),
            lead_id,
            thread.clone(),
            version.clone(),
            cancel.clone(),
        ));

        let can_post = lead.is_assigned_to(user.id);
        info!(lead_id, can_post, "comment view opened");
        Ok(Self {
            lead_id,
            user_id: user.id,
            can_post,
            api,
            thread,
            version,
            live,
            cancel,
            fetch: Some(fetch),
            consumer: Some(consumer),
        })
    }
}

impl<H: HttpClient> CommentSync<H> {
    pub fn lead_id(&self) -> LeadId {
        self.lead_id
    }

    /// Only assignees may post
    pub fn can_post(&self) -> bool {
        self.can_post
    }

    /// Edit and delete are offered on the user's own comments only
    pub fn can_modify(&self, comment: &Comment) -> bool {
        comment.is_authored_by(self.user_id)
    }

    pub fn comments(&self) -> Vec<Comment> {
        lock(&self.thread).comments().to_vec()
    }

    /// Read the thread under its lock
    pub fn with_thread<R>(&self, f: impl FnOnce(&CommentThread) -> R) -> R {
        f(&lock(&self.thread))
    }

    /// Counter bumped on every change to the thread, and once more when
    /// live updates stop
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Whether push events are still being applied
    ///
    /// Turns false when the push connection drops; the thread then only
    /// changes through this view's own post, edit and delete calls.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Wait for the history fetch started by `open`
    ///
    /// Returns the number of fetched comments; later calls return 0.
    pub async fn loaded(&mut self) -> ClientResult<usize> {
        let Some(fetch) = self.fetch.take() else {
            return Ok(0);
        };
        match fetch.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Ok(0),
            Err(e) => Err(ClientError::InvalidResponse(format!(
                "comment fetch task failed: {e}"
            ))),
        }
    }

    /// Post a comment or a reply
    ///
    /// The server copy is merged immediately; the push echo of the same
    /// comment then lands as a no-op. Not retried on failure.
    pub async fn post(&self, content: &str, reply_to: Option<CommentId>) -> ClientResult<Comment> {
        if !self.can_post {
            return Err(ClientError::Forbidden(
                "only assignees can comment on this lead".into(),
            ));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ClientError::Validation("comment cannot be empty".into()));
        }
        if let Some(parent) = reply_to {
            if lock(&self.thread).get(parent).is_none() {
                return Err(ClientError::NotFound(format!("comment {parent}")));
            }
        }

        let body = CommentCreate {
            content: content.to_string(),
            reply_to_id: reply_to,
        };
        let comment = self.api.post_comment(self.lead_id, &body).await?;
        debug!(lead_id = self.lead_id, comment_id = comment.id, "comment posted");
        apply(&self.thread, &self.version, CommentAction::Added(comment.clone()));
        Ok(comment)
    }

    pub async fn edit(&self, comment_id: CommentId, content: &str) -> ClientResult<Comment> {
        self.require_author(comment_id)?;
        let content = content.trim();
        if content.is_empty() {
            return Err(ClientError::Validation("comment cannot be empty".into()));
        }

        let comment = self
            .api
            .edit_comment(self.lead_id, comment_id, content)
            .await?;
        apply(&self.thread, &self.version, CommentAction::Edited(comment.clone()));
        Ok(comment)
    }

    pub async fn delete(&self, comment_id: CommentId) -> ClientResult<()> {
        self.require_author(comment_id)?;
        self.api.delete_comment(self.lead_id, comment_id).await?;
        apply(&self.thread, &self.version, CommentAction::Deleted(comment_id));
        Ok(())
    }

    fn require_author(&self, comment_id: CommentId) -> ClientResult<()> {
        let thread = lock(&self.thread);
        let comment = thread
            .get(comment_id)
            .ok_or_else(|| ClientError::NotFound(format!("comment {comment_id}")))?;
        if !comment.is_authored_by(self.user_id) {
            return Err(ClientError::Forbidden(
                "only the author can change this comment".into(),
            ));
        }
        Ok(())
    }

    /// Stop the view: drop any pending fetch and leave the room
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        if let Some(consumer) = self.consumer.take() {
            if let Err(e) = consumer.await {
                warn!(lead_id = self.lead_id, error = %e, "comment consumer ended abnormally");
            }
        }
        info!(lead_id = self.lead_id, "comment view closed");
    }
}

impl<H: HttpClient> Drop for CommentSync<H> {
    fn drop(&mut self) {
        // The consumer leaves the room once it sees the cancellation
        self.cancel.cancel();
    }
}

async fn fetch_history<H: HttpClient>(
    api: LeadApi<H>,
    lead_id: LeadId,
    thread: SharedThread,
    version: Arc<watch::Sender<u64>>,
    cancel: CancellationToken,
) -> ClientResult<usize> {
    let comments = tokio::select! {
        _ = cancel.cancelled() => return Ok(0),
        result = api.comments(lead_id) => result,
    };
    let comments = match comments {
        Ok(comments) => comments,
        Err(e) => {
            warn!(lead_id, error = %e, "comment history fetch failed");
            return Err(e);
        }
    };
    if cancel.is_cancelled() {
        return Ok(0);
    }
    let count = comments.len();
    apply(&thread, &version, CommentAction::Loaded(comments));
    debug!(lead_id, count, "comment history loaded");
    Ok(count)
}

async fn consume(
    mut room: RoomSubscription,
    thread: SharedThread,
    version: Arc<watch::Sender<u64>>,
    live: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    let lead_id = room.lead_id();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = room.recv() => match event {
                Ok(event) => {
                    debug!(lead_id, event = event.name(), "comment event");
                    apply(&thread, &version, event.into());
                }
                Err(e) => {
                    warn!(lead_id, error = %e, "comment stream ended");
                    live.store(false, Ordering::SeqCst);
                    version.send_modify(|v| *v += 1);
                    return;
                }
            },
        }
    }
    live.store(false, Ordering::SeqCst);
    if let Err(e) = room.release() {
        debug!(lead_id, error = %e, "leave room failed");
    }
}
