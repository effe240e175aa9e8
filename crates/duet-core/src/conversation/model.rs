//! Conversation identity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies the remote party of a one-to-one conversation.
///
/// Supplied by the caller (navigation) when a conversation view is
/// entered and treated as immutable input for the lifetime of that view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// The peer's user id.
    pub peer_id: String,
    /// The peer's display name.
    pub peer_name: String,
}

impl Conversation {
    pub fn new(peer_id: impl Into<String>, peer_name: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            peer_name: peer_name.into(),
        }
    }
}

/// One row of the conversation overview list.
///
/// Returned by the backend's conversations endpoint; used to pick which
/// peer to open a conversation with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// The peer's user id.
    pub peer_id: String,
    /// The peer's display name.
    pub peer_name: String,
    /// Preview of the most recent message in the conversation.
    pub last_message: String,
    /// Timestamp of the most recent message.
    pub timestamp: DateTime<Utc>,
    /// Number of messages not yet read by the caller.
    #[serde(default)]
    pub unread_count: u32,
}

impl ConversationSummary {
    /// The conversation this summary row opens.
    pub fn to_conversation(&self) -> Conversation {
        Conversation::new(&self.peer_id, &self.peer_name)
    }
}
