//! Configuration file handling
//!
//! TOML config at `~/.mdrecall/config.toml`, created with defaults on first
//! load. Everything has a workable default so a fresh install runs without
//! any setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::store::DEFAULT_N_RESULTS;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Qdrant gRPC endpoint
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
    /// Collection holding the ingested documents
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Where Qdrant keeps its index on disk; None means the service default
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Result limit used when a query does not carry its own
    #[serde(default = "default_n_results")]
    pub n_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Ollama endpoint used for embeddings
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    /// Embedding model tag
    #[serde(default = "default_embedding_model")]
    pub model: String,
}

fn default_qdrant_url() -> String {
    "http://127.0.0.1:6334".to_string()
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_n_results() -> usize {
    DEFAULT_N_RESULTS
}

fn default_ollama_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            qdrant_url: default_qdrant_url(),
            collection: default_collection(),
            data_dir: None,
            n_results: default_n_results(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            ollama_url: default_ollama_url(),
            model: default_embedding_model(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&config_path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".mdrecall").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.store.qdrant_url, "http://127.0.0.1:6334");
        assert_eq!(config.store.collection, "documents");
        assert!(config.store.data_dir.is_none());
        assert_eq!(config.store.n_results, DEFAULT_N_RESULTS);
        assert_eq!(config.embedding.model, "nomic-embed-text");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [store]
            collection = "notes"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.collection, "notes");
        assert_eq!(config.store.qdrant_url, "http://127.0.0.1:6334");
        assert_eq!(config.embedding.ollama_url, "http://127.0.0.1:11434");
    }

    #[test]
    fn test_config_round_trips() {
        let mut config = Config::default();
        config.store.data_dir = Some(PathBuf::from("/tmp/qdrant"));
        let toml_string = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.store.data_dir, Some(PathBuf::from("/tmp/qdrant")));
    }
}
