//! mdrecall - main CLI entry point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use mdrecall::cli::{Args, Commands, Verbosity};
use mdrecall::config::Config;
use mdrecall::ingest;
use mdrecall::repl::ChatSession;
use mdrecall::store::{BackendKind, RetrievalStore};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(dir) = &args.data_dir {
        config.store.data_dir = Some(dir.clone());
    }

    let verbosity = args.verbosity();

    match &args.command {
        Commands::Add { paths } => run_add(&config, paths, verbosity).await,
        Commands::Chat { results } => {
            let n_results = (*results).unwrap_or(config.store.n_results);
            run_chat(&config, n_results, verbosity).await
        }
        Commands::Stats => run_stats(&config, verbosity).await,
        Commands::Config => run_config(&config),
    }
}

/// Open the store and report which backend answered the probe
async fn open_store(config: &Config, verbosity: Verbosity) -> RetrievalStore {
    let store = RetrievalStore::open(config).await;

    if verbosity.show_status() {
        if let Some(reason) = store.fallback_reason() {
            println!(
                "{}",
                "Vector backend unavailable, using in-memory keyword fallback".yellow()
            );
            if verbosity.show_details() {
                println!("{}", format!("  {reason}").dimmed());
            }
        } else if verbosity.show_details() {
            println!("{}", "Connected to vector backend".dimmed());
        }
    }

    store
}

async fn run_add(config: &Config, paths: &[PathBuf], verbosity: Verbosity) -> Result<()> {
    let docs = ingest::collect_markdown(paths)?;
    if docs.is_empty() {
        println!("{}", "No markdown documents found.".yellow());
        return Ok(());
    }

    let mut store = open_store(config, verbosity).await;
    let (ids, texts, metadatas) = ingest::batch(&docs);

    let spinner = indexing_spinner(verbosity, docs.len());
    store.add(ids, texts, Some(metadatas), None).await?;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    println!(
        "{}",
        format!(
            "Added {} documents to the {} store.",
            docs.len(),
            store.kind().as_str()
        )
        .green()
    );

    if store.kind() == BackendKind::Keyword {
        println!(
            "{}",
            "Note: the keyword fallback is in-memory; documents last only for one session."
                .dimmed()
        );
    }

    Ok(())
}

async fn run_chat(config: &Config, n_results: usize, verbosity: Verbosity) -> Result<()> {
    let store = open_store(config, verbosity).await;
    let mut session = ChatSession::new(store, n_results)?;
    session.run().await
}

async fn run_stats(config: &Config, verbosity: Verbosity) -> Result<()> {
    let store = open_store(config, verbosity).await;
    let count = store.count().await?;
    println!(
        "{} documents in the {} store",
        count.to_string().bold(),
        store.kind().as_str()
    );
    Ok(())
}

fn run_config(config: &Config) -> Result<()> {
    let path = Config::config_path()?;
    println!("{}", format!("Config file: {}", path.display()).bold());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Spinner shown while documents are embedded and upserted
fn indexing_spinner(verbosity: Verbosity, count: usize) -> Option<ProgressBar> {
    if !verbosity.show_status() {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("static template is valid"),
    );
    spinner.set_message(format!("Indexing {count} documents..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}
