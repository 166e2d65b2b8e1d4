//! Built-in commands for the chat loop

use colored::*;

/// Chat built-in command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    /// Change (or show, with no argument) the per-query result limit
    Results { limit: Option<usize> },
    /// Show which backend answered queries this session
    Backend,
    Clear,
    Unknown { input: String },
}

/// Parse one input line; `None` means the line is a query, not a command
///
/// Bare `exit`/`quit` end the session just like `/exit` does.
pub fn parse(input: &str) -> Option<Command> {
    let trimmed = input.trim();

    if matches!(trimmed.to_lowercase().as_str(), "exit" | "quit") {
        return Some(Command::Exit);
    }

    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed[1..].split_whitespace().collect();
    if parts.is_empty() {
        return Some(Command::Unknown {
            input: input.to_string(),
        });
    }

    let command = match parts[0].to_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "exit" | "quit" | "q" => Command::Exit,
        "results" | "n" => Command::Results {
            limit: parts.get(1).and_then(|s| s.parse().ok()),
        },
        "backend" => Command::Backend,
        "clear" | "cls" => Command::Clear,
        _ => Command::Unknown {
            input: input.to_string(),
        },
    };
    Some(command)
}

/// Print the command reference
pub fn show_help() {
    println!("\n{}", "Available commands:".bold());
    println!("  {}       Show this help", "/help".green());
    println!("  {}  Show or set the per-query result limit", "/results N".green());
    println!("  {}    Show which backend is answering", "/backend".green());
    println!("  {}      Clear the screen", "/clear".green());
    println!("  {}       End the session (or type exit/quit)", "/exit".green());
    println!();
}
