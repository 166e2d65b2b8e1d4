//! Interactive chat loop
//!
//! Reads queries line by line, runs them against the retrieval store, and
//! prints the top hits. Lines starting with `/` (plus bare exit/quit) are
//! built-in commands.

pub mod commands;
pub mod input;

use anyhow::Result;
use colored::*;

use crate::repl::commands::Command;
use crate::repl::input::InputHandler;
use crate::store::{Query, QueryResult, RetrievalStore};

/// How much of a document to show per hit
const SNIPPET_CHARS: usize = 400;

/// Chat session over an opened store
pub struct ChatSession {
    input: InputHandler,
    store: RetrievalStore,
    n_results: usize,
}

impl ChatSession {
    /// Create a session with persistent history in the home directory
    pub fn new(store: RetrievalStore, n_results: usize) -> Result<Self> {
        let input = match dirs::home_dir() {
            Some(home) => InputHandler::with_history(home.join(".mdrecall_history"))?,
            None => InputHandler::new()?,
        };

        Ok(ChatSession {
            input,
            store,
            n_results,
        })
    }

    /// Run the loop until exit/EOF/interrupt
    pub async fn run(&mut self) -> Result<()> {
        self.show_banner();

        loop {
            let line = match self.input.read_line() {
                Ok(Some(line)) => line,
                // Ctrl-D
                Ok(None) => break,
                // Ctrl-C
                Err(_) => break,
            };

            if line.is_empty() {
                continue;
            }

            match commands::parse(&line) {
                Some(command) => {
                    if !self.handle_command(command) {
                        break;
                    }
                }
                None => self.answer(&line).await,
            }
        }

        self.input.save_history()?;
        println!("{}", "Goodbye!".green());
        Ok(())
    }

    fn show_banner(&self) {
        let width = 64;
        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", "  mdrecall - interactive recall".bold().cyan());
        println!(
            "{}",
            format!(
                "  Backend: {} | Results per query: {}",
                self.store.kind().as_str(),
                self.n_results
            )
            .dimmed()
        );
        println!("{}\n", "=".repeat(width).cyan());
        println!(
            "Type a query (or {} for commands, {} to quit)\n",
            "/help".green(),
            "exit".green()
        );
    }

    /// Execute a built-in; returns false when the session should end
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Help => {
                commands::show_help();
                true
            }
            Command::Exit => false,
            Command::Results { limit: Some(limit) } if limit > 0 => {
                self.n_results = limit;
                println!("{}", format!("Result limit set to {limit}").cyan());
                true
            }
            Command::Results { .. } => {
                println!(
                    "{}",
                    format!("Result limit is {}", self.n_results).cyan()
                );
                true
            }
            Command::Backend => {
                println!(
                    "{}",
                    format!("Active backend: {}", self.store.kind().as_str()).cyan()
                );
                if let Some(reason) = self.store.fallback_reason() {
                    println!("{}", format!("Fallback reason: {reason}").dimmed());
                }
                true
            }
            Command::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                true
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {input}").red());
                println!("Type {} for available commands", "/help".cyan());
                true
            }
        }
    }

    async fn answer(&self, query_text: &str) {
        let query = Query::text(query_text).with_limit(self.n_results);
        let results = match self.store.query(&query).await {
            Ok(results) => results,
            Err(err) => {
                println!("{}", format!("Query failed: {err}").red());
                return;
            }
        };

        if results.is_empty() {
            println!("{}", "No results found.".yellow());
            return;
        }

        println!("{}", "Top results:".bold());
        for result in &results {
            println!("{}", render_result(result));
        }
    }
}

/// One hit as `- [score] source: snippet...`
///
/// The source metadata names the file the document came from; without it
/// the document id stands in.
fn render_result(result: &QueryResult) -> String {
    let source = result
        .metadata
        .get("source")
        .and_then(|value| value.as_str())
        .unwrap_or(&result.id);

    let snippet: String = result
        .text
        .chars()
        .take(SNIPPET_CHARS)
        .collect::<String>()
        .replace('\n', " ");

    format!(
        "- [{}] {}: {}...",
        result.score.to_string().cyan(),
        source.bold(),
        snippet
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Metadata;

    fn hit(id: &str, text: &str, metadata: Metadata, score: f32) -> QueryResult {
        QueryResult {
            id: id.to_string(),
            text: text.to_string(),
            metadata,
            score,
        }
    }

    #[test]
    fn test_render_uses_source_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert(
            "source".to_string(),
            serde_json::Value::String("notes/a.md".to_string()),
        );
        let rendered = render_result(&hit("id-1", "body", metadata, 2.0));
        assert!(rendered.contains("notes/a.md"));
        assert!(rendered.contains("2"));
    }

    #[test]
    fn test_render_falls_back_to_id() {
        let rendered = render_result(&hit("plain-id", "body", Metadata::new(), 1.0));
        assert!(rendered.contains("plain-id"));
    }

    #[test]
    fn test_render_collapses_newlines_and_truncates() {
        let text = format!("first\nsecond\n{}", "x".repeat(600));
        let rendered = render_result(&hit("id", &text, Metadata::new(), 0.0));
        assert!(rendered.contains("first second"));
        assert!(!rendered.contains('\n'));
        // 400 chars of document plus the surrounding decoration
        assert!(rendered.chars().count() < 500);
    }
}
