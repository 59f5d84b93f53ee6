//! Configuration system: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use parley_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Provider: {}", cfg.ai.provider);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, resolve_config_path, save_config};
pub use schema::{AiConfig, Config};
