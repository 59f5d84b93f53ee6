//! In-memory conversation store with pairing-aware trimming.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::types::Message;

/// Default number of messages kept per conversation after trimming.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

// ─────────────────────────────────────────────
// ConversationStore
// ─────────────────────────────────────────────

/// Per-chat ordered message lists, keyed by chat id.
///
/// Conversations are created lazily and live for the lifetime of the process.
/// The lock is only ever held for the duration of a copy or an append, never
/// across an `.await`, so turns for different chats interleave freely.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, Vec<Message>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of a chat's conversation, creating an empty one if absent.
    ///
    /// The copy is the turn's snapshot: mutating it never touches the live store.
    pub fn get_or_create(&self, chat_id: &str) -> Vec<Message> {
        if let Some(messages) = self.read().get(chat_id) {
            return messages.clone();
        }
        self.write()
            .entry(chat_id.to_string())
            .or_default()
            .clone()
    }

    /// Append one message to a chat's conversation.
    pub fn append(&self, chat_id: &str, message: Message) {
        self.write()
            .entry(chat_id.to_string())
            .or_default()
            .push(message);
    }

    /// Append several messages, in order, as one step.
    pub fn extend(&self, chat_id: &str, messages: impl IntoIterator<Item = Message>) {
        self.write()
            .entry(chat_id.to_string())
            .or_default()
            .extend(messages);
    }

    /// Trim a conversation to roughly `max_messages`, never splitting a
    /// tool-call/result pair. Returns the number of messages dropped.
    pub fn trim(&self, chat_id: &str, max_messages: usize) -> usize {
        let mut conversations = self.write();
        let Some(messages) = conversations.get_mut(chat_id) else {
            return 0;
        };
        let cut = trim_start(messages, max_messages);
        if cut > 0 {
            messages.drain(..cut);
            debug!(chat_id, dropped = cut, kept = messages.len(), "trimmed conversation");
        }
        cut
    }

    /// Number of messages in a chat's conversation (0 if unknown).
    pub fn len(&self, chat_id: &str) -> usize {
        self.read().get(chat_id).map_or(0, Vec::len)
    }

    /// Whether the chat has no messages.
    pub fn is_empty(&self, chat_id: &str) -> bool {
        self.len(chat_id) == 0
    }

    /// Reset a chat's conversation (transport-initiated).
    pub fn clear(&self, chat_id: &str) {
        if let Some(messages) = self.write().get_mut(chat_id) {
            messages.clear();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Message>>> {
        self.conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Message>>> {
        self.conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ─────────────────────────────────────────────
// Trimming
// ─────────────────────────────────────────────

/// Index of the first message to keep when trimming `messages` to `max_messages`.
///
/// Starts at the naive cut and walks forward past tool results, so the
/// retained window never opens on a result whose call was dropped. Returns 0
/// (keep everything) when the history fits or no safe boundary exists.
pub fn trim_start(messages: &[Message], max_messages: usize) -> usize {
    if messages.len() <= max_messages {
        return 0;
    }
    let naive = messages.len() - max_messages;
    messages[naive..]
        .iter()
        .position(|m| !m.is_tool_result())
        .map_or(0, |offset| naive + offset)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolCall;

    fn tool_pair(id: &str, results: usize) -> Vec<Message> {
        let mut pair = vec![Message::assistant_tool_calls(
            None,
            (0..results)
                .map(|i| ToolCall::new(format!("{id}_{i}"), "lookup", "{}"))
                .collect(),
        )];
        for i in 0..results {
            pair.push(Message::tool_result(format!("{id}_{i}"), "{}"));
        }
        pair
    }

    #[test]
    fn test_get_or_create_new_conversation() {
        let store = ConversationStore::new();
        assert!(store.get_or_create("42").is_empty());
        assert!(store.is_empty("42"));
    }

    #[test]
    fn test_append_and_len() {
        let store = ConversationStore::new();
        store.append("42", Message::user("hello"));
        store.append("42", Message::assistant("hi there!"));
        assert_eq!(store.len("42"), 2);
        assert_eq!(store.len("other"), 0);
        assert!(store.is_empty("other"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = ConversationStore::new();
        store.append("42", Message::user("hello"));
        let mut snapshot = store.get_or_create("42");
        snapshot.push(Message::assistant("not yet"));
        assert_eq!(store.len("42"), 1);
    }

    #[test]
    fn test_extend_preserves_order() {
        let store = ConversationStore::new();
        store.extend("a", tool_pair("c", 2));
        let messages = store.get_or_create("a");
        assert_eq!(messages.len(), 3);
        assert!(!messages[0].is_tool_result());
        assert!(messages[1].is_tool_result());
    }

    #[test]
    fn test_conversations_independent() {
        let store = ConversationStore::new();
        store.append("a", Message::user("hello a"));
        store.append("b", Message::user("hello b"));
        store.append("b", Message::user("hello b again"));
        assert_eq!(store.len("a"), 1);
        assert_eq!(store.len("b"), 2);
    }

    #[test]
    fn test_clear() {
        let store = ConversationStore::new();
        store.append("a", Message::user("hello"));
        store.clear("a");
        assert!(store.is_empty("a"));
    }

    #[test]
    fn test_trim_noop_under_limit() {
        let store = ConversationStore::new();
        for i in 0..5 {
            store.append("a", Message::user(format!("msg {i}")));
        }
        assert_eq!(store.trim("a", 20), 0);
        assert_eq!(store.len("a"), 5);
    }

    #[test]
    fn test_trim_plain_history_keeps_last_max() {
        let store = ConversationStore::new();
        for i in 0..30 {
            store.append("a", Message::user(format!("msg {i}")));
        }
        assert_eq!(store.trim("a", 20), 10);
        let messages = store.get_or_create("a");
        assert_eq!(messages.len(), 20);
        assert_eq!(messages[0], Message::user("msg 10"));
    }

    #[test]
    fn test_trim_skips_tool_results_at_cut() {
        // user, assistant(calls x2), tool, tool, assistant, user ... cut lands on a tool result
        let mut messages = vec![Message::user("q")];
        messages.extend(tool_pair("c", 2));
        messages.push(Message::assistant("done"));
        messages.push(Message::user("next"));
        // len 6, max 4 → naive cut 2 (first tool result) → walk to 4
        assert_eq!(trim_start(&messages, 4), 4);
    }

    #[test]
    fn test_trim_all_tool_history_is_noop() {
        let messages: Vec<Message> = (0..10)
            .map(|i| Message::tool_result(format!("c{i}"), "{}"))
            .collect();
        assert_eq!(trim_start(&messages, 3), 0);
    }

    #[test]
    fn test_trim_window_never_starts_on_tool_result() {
        for max in 1..12 {
            let mut messages = Vec::new();
            for turn in 0..6 {
                messages.push(Message::user(format!("q{turn}")));
                messages.extend(tool_pair(&format!("t{turn}"), turn % 3 + 1));
                messages.push(Message::assistant(format!("a{turn}")));
            }
            let cut = trim_start(&messages, max);
            assert!(!messages[cut].is_tool_result(), "max {max} cut {cut}");
        }
    }

    #[test]
    fn test_trim_keeps_pairs_whole() {
        let store = ConversationStore::new();
        for turn in 0..6 {
            store.append("a", Message::user(format!("q{turn}")));
            store.extend("a", tool_pair(&format!("t{turn}"), 2));
            store.append("a", Message::assistant(format!("a{turn}")));
        }
        assert_eq!(store.len("a"), 30);
        // naive cut 12 is a tool result of turn 2 → window opens on a2
        assert_eq!(store.trim("a", 18), 14);

        let messages = store.get_or_create("a");
        assert_eq!(messages.len(), 16);
        assert_eq!(messages[0], Message::assistant("a2"));
        // Every retained tool result has its originating call retained.
        for (idx, message) in messages.iter().enumerate() {
            if let Message::Tool { tool_call_id, .. } = message {
                assert!(messages[..idx]
                    .iter()
                    .any(|m| m.tool_calls().iter().any(|c| &c.id == tool_call_id)));
            }
        }
        // Every retained call has all its results retained.
        for message in &messages {
            for call in message.tool_calls() {
                assert!(messages.iter().any(|m| matches!(
                    m,
                    Message::Tool { tool_call_id, .. } if tool_call_id == &call.id
                )));
            }
        }
    }

    #[test]
    fn test_trim_unknown_chat() {
        let store = ConversationStore::new();
        assert_eq!(store.trim("missing", 5), 0);
    }
}
