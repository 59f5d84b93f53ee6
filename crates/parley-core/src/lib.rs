//! Parley core: conversation types, the in-memory conversation store,
//! configuration, and shared helpers.

pub mod config;
pub mod session;
pub mod types;
pub mod utils;

pub use config::Config;
pub use session::ConversationStore;
pub use types::{
    ContentPart, ImageAttachment, Message, MessageContent, ToolCall, ToolDescriptor,
    ToolInvocation, ToolParams, ToolResult,
};
