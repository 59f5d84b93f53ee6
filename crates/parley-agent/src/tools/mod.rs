//! Tool modules for the Parley agent.

pub mod base;
pub mod host;
pub mod registry;
pub mod remember;

pub use base::{optional_string, require_string, Tool};
pub use host::{format_descriptors, ToolCallStatus, ToolContext, ToolHost};
pub use registry::ToolRegistry;
pub use remember::RememberTool;
