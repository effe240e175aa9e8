//! Conversation synchronization engine.
//!
//! One `ConversationSync` instance backs one conversation view. It owns:
//!
//! - the poll loop, a cancellable scheduled task that re-fetches the
//!   message list on a fixed interval and fully replaces the previous
//!   polled list on success,
//! - the optimistic send path, which merges a locally authored message
//!   into the list without waiting for the next tick,
//! - the pending-draft buffer the reconciler folds into the rendered
//!   list.
//!
//! The engine never shares state across instances. Cancellation is
//! guaranteed on drop, and a poll result that resolves after cancellation
//! is discarded.

use duet_core::conversation::{Conversation, DraftMessage, ListEntry, Message, reconcile};
use duet_core::error::{DuetError, Result};
use duet_core::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::ConversationApi;

/// Lifecycle of a conversation view.
///
/// `Loading` until the first poll attempt completes, `Ready` while the
/// poll loop is active, `Sending` transiently while a send request is
/// outstanding (polling continues uninterrupted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Loading,
    Ready,
    Sending,
}

/// Result of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message was submitted and merged into the list.
    Sent,
    /// The text was empty after trimming; nothing was done.
    Skipped,
}

/// Mutable engine state. The poll loop is the only writer of `polled`,
/// the send path the only writer of `pending` and `draft`.
struct SyncState {
    phase: SyncPhase,
    polled: Vec<Message>,
    pending: Vec<DraftMessage>,
    draft: String,
    last_error: Option<DuetError>,
}

struct Inner {
    api: Arc<dyn ConversationApi>,
    session: Session,
    conversation: Conversation,
    state: RwLock<SyncState>,
    cancel: CancellationToken,
}

impl Inner {
    /// Runs one poll tick: fetch, then apply unless cancelled meanwhile.
    async fn poll_once(&self) -> Result<()> {
        let result = self
            .api
            .fetch_conversation(&self.session, &self.conversation.peer_id)
            .await;

        // The view may have been torn down while the fetch was in
        // flight; a stale result must not be applied.
        if self.cancel.is_cancelled() {
            tracing::debug!(
                "[ConversationSync] Discarding poll result for {} after cancellation",
                self.conversation.peer_id
            );
            return Ok(());
        }

        let mut state = self.state.write().await;
        match result {
            Ok(messages) => {
                // Drop drafts the server has echoed back, then fully
                // replace the polled list.
                state
                    .pending
                    .retain(|draft| !messages.iter().any(|m| draft.is_confirmed_by(m)));
                state.polled = messages;
                state.last_error = None;
                if state.phase == SyncPhase::Loading {
                    state.phase = SyncPhase::Ready;
                }
                Ok(())
            }
            Err(e) => {
                // Recoverable or not, the previous list is retained and
                // the error is surfaced as a non-blocking notice.
                state.last_error = Some(e.clone());
                if state.phase == SyncPhase::Loading {
                    state.phase = SyncPhase::Ready;
                }
                Err(e)
            }
        }
    }

    /// Submits trimmed message text and merges the result into the list.
    async fn send(&self, text: &str) -> Result<SendOutcome> {
        let content = text.trim();
        if content.is_empty() {
            // Whitespace-only input is a no-op, not an error: no network
            // call, no list mutation.
            return Ok(SendOutcome::Skipped);
        }

        {
            let mut state = self.state.write().await;
            if state.phase == SyncPhase::Ready {
                state.phase = SyncPhase::Sending;
            }
        }

        let result = self
            .api
            .send_message(&self.session, &self.conversation.peer_id, content)
            .await;

        let mut state = self.state.write().await;
        if state.phase == SyncPhase::Sending {
            state.phase = SyncPhase::Ready;
        }

        match result {
            Ok(ack) => {
                match ack {
                    // The server echoed the persisted row: merge it as
                    // confirmed without waiting for the next tick.
                    Some(message) => state.polled.push(message),
                    // No payload: keep the local draft pending until a
                    // poll confirms it.
                    None => state
                        .pending
                        .push(DraftMessage::new(&self.session.user_id, content)),
                }
                state.draft.clear();
                Ok(SendOutcome::Sent)
            }
            // List and draft stay untouched; the submitter decides what
            // to do with the error.
            Err(e) => Err(e),
        }
    }
}

/// Synchronization engine for one conversation view.
pub struct ConversationSync {
    inner: Arc<Inner>,
    poll_interval: Duration,
}

impl std::fmt::Debug for ConversationSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSync")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl ConversationSync {
    /// Creates an engine for a conversation with the given peer.
    ///
    /// No network action is taken until [`start`](Self::start) or
    /// [`poll_once`](Self::poll_once) is called.
    ///
    /// # Errors
    ///
    /// Returns an identity error when the peer id is empty (the view was
    /// entered without a target peer).
    pub fn new(
        api: Arc<dyn ConversationApi>,
        session: Session,
        conversation: Conversation,
        poll_interval: Duration,
    ) -> Result<Self> {
        if conversation.peer_id.trim().is_empty() {
            return Err(DuetError::identity("conversation has no peer id"));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                api,
                session,
                conversation,
                state: RwLock::new(SyncState {
                    phase: SyncPhase::Loading,
                    polled: Vec::new(),
                    pending: Vec::new(),
                    draft: String::new(),
                    last_error: None,
                }),
                cancel: CancellationToken::new(),
            }),
            poll_interval,
        })
    }

    /// Starts the poll loop.
    ///
    /// The first tick fires immediately, so the view gets its initial
    /// fetch on mount. Ticks that would pile up behind a slow fetch are
    /// skipped rather than burst. The loop exits when the engine is shut
    /// down or dropped.
    pub fn start(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(
                "[ConversationSync] Poll loop started for peer {} ({:?} interval)",
                inner.conversation.peer_id,
                poll_interval
            );

            loop {
                tokio::select! {
                    _ = inner.cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = inner.poll_once().await {
                            tracing::warn!(
                                "[ConversationSync] Poll failed for peer {}: {}",
                                inner.conversation.peer_id,
                                e
                            );
                        }
                    }
                }
            }

            tracing::info!(
                "[ConversationSync] Poll loop stopped for peer {}",
                inner.conversation.peer_id
            );
        })
    }

    /// Runs a single poll tick outside the loop.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the previous list is retained and the
    /// same error is available via [`last_error`](Self::last_error).
    pub async fn poll_once(&self) -> Result<()> {
        self.inner.poll_once().await
    }

    /// Submits message text.
    ///
    /// Empty or whitespace-only text is skipped without a network call.
    /// On success the message is merged into the list immediately and the
    /// draft is cleared; on failure the list and draft are unchanged.
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        self.inner.send(text).await
    }

    /// Submits the current input draft.
    pub async fn send_draft(&self) -> Result<SendOutcome> {
        let draft = self.inner.state.read().await.draft.clone();
        self.send(&draft).await
    }

    /// Replaces the input draft.
    pub async fn set_draft(&self, text: impl Into<String>) {
        self.inner.state.write().await.draft = text.into();
    }

    /// Current input draft.
    pub async fn draft(&self) -> String {
        self.inner.state.read().await.draft.clone()
    }

    /// The reconciled message list to render, ordered by timestamp.
    pub async fn messages(&self) -> Vec<ListEntry> {
        let state = self.inner.state.read().await;
        reconcile(&state.polled, &state.pending)
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> SyncPhase {
        self.inner.state.read().await.phase
    }

    /// The most recent poll error, cleared by the next successful poll.
    pub async fn last_error(&self) -> Option<DuetError> {
        self.inner.state.read().await.last_error.clone()
    }

    /// The conversation this engine synchronizes.
    pub fn conversation(&self) -> &Conversation {
        &self.inner.conversation
    }

    /// Stops the poll loop. Idempotent.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }
}

impl Drop for ConversationSync {
    fn drop(&mut self) {
        // The poll task only holds `Inner`, so dropping the engine on any
        // exit path stops it.
        self.inner.cancel.cancel();
    }
}
