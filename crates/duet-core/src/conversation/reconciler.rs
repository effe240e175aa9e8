//! Poll/pending reconciliation.
//!
//! Each poll tick fully replaces the confirmed message list; drafts sent
//! since the last tick live alongside it until the server echoes them
//! back. `reconcile` merges the two into the single ordered list handed
//! to the presentation layer.

use super::message::{DraftMessage, ListEntry, Message};
use std::collections::HashSet;

/// Merges the latest polled list with locally appended pending drafts.
///
/// Guarantees on the produced list:
/// - single total order by timestamp, stable for equal timestamps
///   (confirmed messages keep server order, drafts keep send order),
/// - confirmed messages deduplicated by server id,
/// - a draft is dropped once its server-confirmed copy appears in the
///   polled list, so no message renders twice.
pub fn reconcile(polled: &[Message], pending: &[DraftMessage]) -> Vec<ListEntry> {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut entries: Vec<ListEntry> = Vec::with_capacity(polled.len() + pending.len());

    for message in polled {
        if let Some(id) = message.id.as_deref() {
            if !seen_ids.insert(id) {
                continue;
            }
        }
        entries.push(ListEntry::Confirmed(message.clone()));
    }

    for draft in pending {
        let acknowledged = polled.iter().any(|m| draft.is_confirmed_by(m));
        if !acknowledged {
            entries.push(ListEntry::Pending(draft.clone()));
        }
    }

    // Stable sort: equal timestamps keep their relative append order.
    entries.sort_by_key(|entry| entry.timestamp());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::EntryKey;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashSet;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn confirmed(id: &str, sender: &str, content: &str, secs: i64) -> Message {
        Message {
            id: Some(id.into()),
            sender_id: sender.into(),
            content: content.into(),
            timestamp: at(secs),
        }
    }

    fn draft(sender: &str, content: &str, secs: i64) -> DraftMessage {
        DraftMessage {
            sender_id: sender.into(),
            content: content.into(),
            timestamp: at(secs),
        }
    }

    fn assert_no_duplicate_keys(entries: &[ListEntry]) {
        let mut keys: HashSet<EntryKey> = HashSet::new();
        for entry in entries {
            assert!(keys.insert(entry.key()), "duplicate key: {:?}", entry.key());
        }
    }

    #[test]
    fn test_orders_by_timestamp() {
        let polled = vec![
            confirmed("b", "peer", "second", 20),
            confirmed("a", "me", "first", 10),
        ];
        let entries = reconcile(&polled, &[]);
        let contents: Vec<&str> = entries.iter().map(|e| e.content()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_no_duplicate_keys(&entries);
    }

    #[test]
    fn test_deduplicates_by_server_id() {
        let polled = vec![
            confirmed("a", "me", "hello", 10),
            confirmed("a", "me", "hello", 10),
        ];
        let entries = reconcile(&polled, &[]);
        assert_eq!(entries.len(), 1);
        assert_no_duplicate_keys(&entries);
    }

    #[test]
    fn test_pending_draft_kept_until_confirmed() {
        let polled = vec![confirmed("a", "peer", "hi", 10)];
        let pending = vec![draft("me", "on my way", 20)];
        let entries = reconcile(&polled, &pending);
        assert_eq!(entries.len(), 2);
        assert!(entries[1].is_pending());
        assert_eq!(entries[1].content(), "on my way");
    }

    #[test]
    fn test_confirmed_copy_replaces_pending() {
        let pending = vec![draft("me", "on my way", 20)];
        let polled = vec![
            confirmed("a", "peer", "hi", 10),
            confirmed("b", "me", "on my way", 21),
        ];
        let entries = reconcile(&polled, &pending);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.is_pending()));
        assert_eq!(
            entries.iter().filter(|e| e.content() == "on my way").count(),
            1
        );
        assert_no_duplicate_keys(&entries);
    }

    #[test]
    fn test_equal_timestamps_keep_send_order() {
        // Two drafts sent within the same tick; server order ambiguous.
        let pending = vec![draft("me", "first send", 30), draft("me", "second send", 30)];
        let polled = vec![confirmed("a", "peer", "hi", 30)];
        let entries = reconcile(&polled, &pending);
        let contents: Vec<&str> = entries.iter().map(|e| e.content()).collect();
        assert_eq!(contents, vec!["hi", "first send", "second send"]);
    }

    #[test]
    fn test_identical_repeated_draft_only_matches_once() {
        // The caller sent the same text twice; one confirmed copy must
        // only absorb drafts, not render twice itself.
        let pending = vec![draft("me", "ping", 10), draft("me", "ping", 12)];
        let polled = vec![confirmed("a", "me", "ping", 11)];
        let entries = reconcile(&polled, &pending);
        // The confirmed copy at t=11 acknowledges the t=10 draft; the
        // t=12 draft is newer than the server copy and stays pending.
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_pending());
        assert!(entries[1].is_pending());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(reconcile(&[], &[]).is_empty());
    }
}
