//! Interactive REPL over one chat id.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use parley_agent::Agent;
use parley_core::config::Config;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// What a line of input asks the REPL to do.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Exit,
    Clear,
    Message(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Empty
    } else if EXIT_COMMANDS.contains(&trimmed.to_lowercase().as_str()) {
        Input::Exit
    } else if trimmed.eq_ignore_ascii_case("/clear") {
        Input::Clear
    } else {
        Input::Message(trimmed)
    }
}

/// Run the interactive REPL loop.
pub async fn run(agent: &Agent, config: &Config, chat_id: &str) -> Result<()> {
    helpers::print_banner(chat_id);

    let mut editor = create_editor()?;

    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let text = match classify(&line) {
            Input::Empty => continue,
            Input::Exit => {
                println!("\nGoodbye!");
                break;
            }
            Input::Clear => {
                agent.store().clear(chat_id);
                println!("(conversation cleared)\n");
                continue;
            }
            Input::Message(text) => text,
        };

        let _ = editor.add_history_entry(&line);

        debug!(chat_id, input = text, "processing input");
        helpers::print_thinking();

        let result = agent.get_ai_response(config, chat_id, text, None).await;
        helpers::clear_thinking();
        match result {
            Ok(response) => helpers::print_response(&response),
            Err(e) => eprintln!("\nError: {e}\n"),
        }
    }

    save_history(&mut editor);
    Ok(())
}

fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_path() -> std::path::PathBuf {
    parley_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_commands() {
        assert_eq!(classify("  "), Input::Empty);
        assert_eq!(classify("EXIT"), Input::Exit);
        assert_eq!(classify(":q"), Input::Exit);
        assert_eq!(classify("/clear"), Input::Clear);
        assert_eq!(classify("  hello there "), Input::Message("hello there"));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".parley"));
        assert!(path.ends_with("history/cli_history"));
    }
}
