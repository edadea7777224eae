//! Comment threads: a reducer over fetched history and push events, and
//! the live per-lead view built on it

pub mod sync;
pub mod thread;

pub use sync::CommentSync;
pub use thread::{CommentAction, CommentThread, ThreadEntry};
