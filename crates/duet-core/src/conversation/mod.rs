//! Conversation domain module.
//!
//! This module contains the types for a one-to-one conversation and the
//! reconciliation logic that merges server-polled messages with locally
//! appended, not-yet-acknowledged drafts.
//!
//! # Module Structure
//!
//! - `model`: Conversation identity types (`Conversation`, `ConversationSummary`)
//! - `message`: Message types (`Message`, `DraftMessage`, `ListEntry`, `EntryKey`)
//! - `reconciler`: Poll/pending merge (`reconcile`)

mod message;
mod model;
mod reconciler;

// Re-export public API
pub use message::{DraftMessage, EntryKey, ListEntry, Message};
pub use model::{Conversation, ConversationSummary};
pub use reconciler::reconcile;
