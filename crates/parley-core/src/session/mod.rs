//! Conversation store: per-chat message history kept in memory.
//!
//! History is process-local: it is created lazily on a chat's first message
//! and is never written to disk.

pub mod store;

pub use store::{trim_start, ConversationStore, DEFAULT_HISTORY_LIMIT};
