//! Parley Agent: the turn loop, tool hosting, and memory-backed prompts.
//!
//! This crate contains:
//! - **agent_loop**: one user turn, including bounded tool rounds
//! - **tools**: the `ToolHost` seam, the in-process registry, built-in tools
//! - **memory**: file-based memory and the system prompt composer

pub mod agent_loop;
pub mod error;
pub mod memory;
pub mod tools;

pub use agent_loop::Agent;
pub use error::AgentError;
pub use memory::{MemoryPromptComposer, MemoryStore, PromptComposer};
pub use tools::{Tool, ToolContext, ToolHost, ToolRegistry};
