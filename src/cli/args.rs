//! Command-line argument parsing
//!
//! clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mdrecall - Ingest markdown notes and query them from the terminal
#[derive(Parser, Debug)]
#[command(name = "mdrecall")]
#[command(version)]
#[command(about = "Ingest markdown notes into a vector store and query them", long_about = None)]
pub struct Args {
    /// Directory where the vector store should keep its index
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Verbosity level: default (normal), -v (verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress everything except results)
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest markdown files or directories into the store
    Add {
        /// Files or directories to ingest (directories are walked for *.md)
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Interactive query session against the store
    Chat {
        /// Number of results per query
        #[arg(short = 'n', long)]
        results: Option<usize>,
    },

    /// Show how many documents the store holds
    Stats,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose == 0 {
            Verbosity::Normal
        } else {
            Verbosity::Verbose
        }
    }
}

impl Verbosity {
    /// Check if backend selection and progress should be reported
    pub fn show_status(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if per-step details should be reported
    pub fn show_details(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_paths() {
        let args = Args::try_parse_from(["mdrecall", "add", "notes/", "todo.md"]).unwrap();
        match args.command {
            Commands::Add { paths } => {
                assert_eq!(paths, [PathBuf::from("notes/"), PathBuf::from("todo.md")]);
            }
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn test_add_requires_paths() {
        assert!(Args::try_parse_from(["mdrecall", "add"]).is_err());
    }

    #[test]
    fn test_parse_chat_with_limit() {
        let args = Args::try_parse_from(["mdrecall", "chat", "-n", "5"]).unwrap();
        match args.command {
            Commands::Chat { results } => assert_eq!(results, Some(5)),
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn test_verbosity_quiet_wins() {
        let args = Args::try_parse_from(["mdrecall", "-q", "-v", "stats"]).unwrap();
        assert_eq!(args.verbosity(), Verbosity::Quiet);
        assert!(!args.verbosity().show_status());
    }

    #[test]
    fn test_verbosity_verbose() {
        let args = Args::try_parse_from(["mdrecall", "-v", "stats"]).unwrap();
        assert_eq!(args.verbosity(), Verbosity::Verbose);
        assert!(args.verbosity().show_details());
    }

    #[test]
    fn test_data_dir_flag() {
        let args = Args::try_parse_from(["mdrecall", "--data-dir", "/tmp/idx", "stats"]).unwrap();
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/idx")));
    }
}
