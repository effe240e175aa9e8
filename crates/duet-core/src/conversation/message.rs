//! Message types for a conversation.
//!
//! A rendered conversation is a list of [`ListEntry`] values: messages the
//! server has confirmed, plus drafts the caller sent optimistically that
//! the server has not echoed back yet. The tagged union keeps the two
//! apart until reconciliation replaces a `Pending` entry with its
//! `Confirmed` counterpart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message as known to the server.
///
/// `id` is assigned by the server. It is absent on messages that were
/// created optimistically and have not been confirmed by a poll yet, and
/// on send acknowledgements from older backend builds that do not return
/// the persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned identifier, absent until persistence is confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// User id of the author.
    pub sender_id: String,
    /// Message body.
    pub content: String,
    /// Ordering key for the conversation list.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Whether this message was authored by the given user.
    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender_id == user_id
    }
}

/// A locally authored message awaiting server confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftMessage {
    /// User id of the author (always the caller).
    pub sender_id: String,
    /// Message body as submitted (already trimmed).
    pub content: String,
    /// Local submission time; the server assigns its own timestamp to the
    /// persisted copy.
    pub timestamp: DateTime<Utc>,
}

impl DraftMessage {
    pub fn new(sender_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether a polled message is the server-confirmed copy of this draft.
    ///
    /// There is no shared identifier to compare, so the match is
    /// author + content, with the server timestamp at or after the local
    /// submission time (the server stamps the persisted copy itself).
    pub fn is_confirmed_by(&self, message: &Message) -> bool {
        message.sender_id == self.sender_id
            && message.content == self.content
            && message.timestamp >= self.timestamp
    }
}

/// One entry of the rendered conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListEntry {
    /// A message the server has confirmed.
    Confirmed(Message),
    /// A locally sent message the server has not echoed back yet.
    Pending(DraftMessage),
}

impl ListEntry {
    /// The ordering key shared by both variants.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Confirmed(m) => m.timestamp,
            Self::Pending(d) => d.timestamp,
        }
    }

    /// User id of the author.
    pub fn sender_id(&self) -> &str {
        match self {
            Self::Confirmed(m) => &m.sender_id,
            Self::Pending(d) => &d.sender_id,
        }
    }

    /// Message body.
    pub fn content(&self) -> &str {
        match self {
            Self::Confirmed(m) => &m.content,
            Self::Pending(d) => &d.content,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Identity key for deduplication.
    pub fn key(&self) -> EntryKey {
        match self {
            Self::Confirmed(m) => match &m.id {
                Some(id) => EntryKey::Id(id.clone()),
                None => EntryKey::composite(&m.sender_id, &m.content, m.timestamp),
            },
            Self::Pending(d) => EntryKey::composite(&d.sender_id, &d.content, d.timestamp),
        }
    }
}

/// Identity of a list entry.
///
/// The server-assigned id is authoritative once present; optimistic
/// entries fall back to a sender + content + timestamp composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Id(String),
    Composite {
        sender_id: String,
        content: String,
        timestamp: DateTime<Utc>,
    },
}

impl EntryKey {
    fn composite(sender_id: &str, content: &str, timestamp: DateTime<Utc>) -> Self {
        Self::Composite {
            sender_id: sender_id.to_string(),
            content: content.to_string(),
            timestamp,
        }
    }
}
