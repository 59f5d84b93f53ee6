//! Memory system: long-term memory and daily notes feeding the system prompt.
//!
//! Memory is file-based:
//! - **Long-term memory**: `workspace/memory/MEMORY.md`
//! - **Daily notes**: `workspace/memory/YYYY-MM-DD.md`
//!
//! [`MemoryPromptComposer`] reads both on every turn and appends them to the
//! configured base prompt.

use std::path::{Path, PathBuf};

use tracing::debug;

use parley_core::utils::today_date;

// ─────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────

/// File-based memory store.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    memory_dir: PathBuf,
    memory_file: PathBuf,
}

impl MemoryStore {
    /// Create a memory store rooted at `workspace`. Nothing is created on disk
    /// until the first write.
    pub fn new(workspace: &Path) -> Self {
        let memory_dir = workspace.join("memory");
        let memory_file = memory_dir.join("MEMORY.md");
        Self {
            memory_dir,
            memory_file,
        }
    }

    /// Read the long-term memory file. Returns empty string if absent.
    pub fn read_long_term(&self) -> String {
        std::fs::read_to_string(&self.memory_file).unwrap_or_default()
    }

    pub fn today_file(&self) -> PathBuf {
        self.memory_dir.join(format!("{}.md", today_date()))
    }

    /// Read today's daily notes. Returns empty string if absent.
    pub fn read_today(&self) -> String {
        std::fs::read_to_string(self.today_file()).unwrap_or_default()
    }

    /// Append a line to today's notes, creating the file with a date header.
    pub fn append_today(&self, content: &str) -> std::io::Result<()> {
        self.ensure_dir()?;
        let path = self.today_file();
        let updated = match std::fs::read_to_string(&path) {
            Ok(mut existing) => {
                existing.push('\n');
                existing.push_str(content);
                existing
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("# {}\n\n{content}", today_date())
            }
            Err(e) => return Err(e),
        };
        std::fs::write(&path, updated)
    }

    /// Memory section for the system prompt, or `None` if nothing is stored.
    ///
    /// ```text
    /// # Memory
    ///
    /// ## Long-term Memory
    /// <MEMORY.md>
    ///
    /// ## Today's Notes (YYYY-MM-DD)
    /// <today's file>
    /// ```
    pub fn get_memory_context(&self) -> Option<String> {
        let mut sections = Vec::new();

        let long_term = self.read_long_term();
        if !long_term.trim().is_empty() {
            sections.push(format!("## Long-term Memory\n\n{}", long_term.trim_end()));
        }

        let today = self.read_today();
        if !today.trim().is_empty() {
            sections.push(format!(
                "## Today's Notes ({})\n\n{}",
                today_date(),
                today.trim_end()
            ));
        }

        if sections.is_empty() {
            None
        } else {
            Some(format!("# Memory\n\n{}", sections.join("\n\n")))
        }
    }

    pub fn memory_dir(&self) -> &Path {
        &self.memory_dir
    }

    fn ensure_dir(&self) -> std::io::Result<()> {
        if !self.memory_dir.exists() {
            std::fs::create_dir_all(&self.memory_dir)?;
            debug!(dir = %self.memory_dir.display(), "created memory directory");
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Prompt composition
// ─────────────────────────────────────────────

/// Builds the system prompt sent with every request.
pub trait PromptComposer: Send + Sync {
    fn build_system_prompt_with_memory(&self, base: &str) -> String;
}

/// Appends stored memory to the base prompt.
#[derive(Clone, Debug)]
pub struct MemoryPromptComposer {
    store: MemoryStore,
}

impl MemoryPromptComposer {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

impl PromptComposer for MemoryPromptComposer {
    fn build_system_prompt_with_memory(&self, base: &str) -> String {
        match self.store.get_memory_context() {
            Some(memory) => format!("{base}\n\n---\n\n{memory}"),
            None => base.to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
