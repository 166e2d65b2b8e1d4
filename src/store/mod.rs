//! Retrieval store: one facade, two interchangeable backends
//!
//! `RetrievalStore` presents a single `add`/`query` surface. At open time it
//! probes the Qdrant service once; if the service is reachable all calls go
//! through the vector backend, otherwise they go through a dependency-free
//! in-memory keyword backend. The choice is made exactly once and cached.

pub mod keyword;
pub mod vector;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::config::Config;
use crate::errors::{Result, StoreError};

pub use keyword::KeywordBackend;
pub use vector::{Unavailable, VectorBackend};

/// Per-document key/value annotations carried alongside the text
pub type Metadata = HashMap<String, JsonValue>;

/// Result limit used when the caller does not give one
pub const DEFAULT_N_RESULTS: usize = 3;

/// A single retrieval hit
///
/// `score` direction differs by backend: the keyword backend reports a raw
/// token match count (higher is better) while the vector backend reports a
/// cosine distance (lower is better). Both travel under the same field;
/// callers that care which way is "up" check [`RetrievalStore::kind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    pub score: f32,
}

/// Search request accepted by both backends
#[derive(Debug, Clone)]
pub struct Query {
    /// Free-text query; the vector backend embeds it before searching
    pub text: Option<String>,
    /// Precomputed query embedding; takes precedence over `text`
    pub embedding: Option<Vec<f32>>,
    /// Maximum number of results to return
    pub n_results: usize,
}

impl Default for Query {
    fn default() -> Self {
        Query {
            text: None,
            embedding: None,
            n_results: DEFAULT_N_RESULTS,
        }
    }
}

impl Query {
    /// Build a free-text query
    pub fn text(text: impl Into<String>) -> Self {
        Query {
            text: Some(text.into()),
            ..Query::default()
        }
    }

    /// Build a query from a precomputed embedding
    pub fn embedding(embedding: Vec<f32>) -> Self {
        Query {
            embedding: Some(embedding),
            ..Query::default()
        }
    }

    /// Override the result limit
    pub fn with_limit(mut self, n_results: usize) -> Self {
        self.n_results = n_results;
        self
    }
}

/// Contract both backends implement
///
/// `add` either stores the whole batch or fails without mutating anything.
/// `query` returns at most `n_results` hits ordered best-first; an empty
/// store or a query matching nothing yields an empty vec, never an error.
#[async_trait]
pub trait RetrievalBackend {
    async fn add(
        &mut self,
        ids: Vec<String>,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        embeddings: Option<Vec<Vec<f32>>>,
    ) -> Result<()>;

    async fn query(&self, query: &Query) -> Result<Vec<QueryResult>>;
}

/// Which backend a store ended up with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Keyword,
    Vector,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Keyword => "keyword",
            BackendKind::Vector => "vector",
        }
    }
}

enum Backend {
    Keyword(KeywordBackend),
    Vector(VectorBackend),
}

/// Facade over the active backend
pub struct RetrievalStore {
    backend: Backend,
    fallback_reason: Option<String>,
}

impl RetrievalStore {
    /// Open a store, preferring the vector backend
    ///
    /// Connecting performs one reachability probe against Qdrant. An
    /// unreachable service downgrades to the keyword backend; the reason is
    /// kept for the caller to report. A failure of the collection bootstrap
    /// is deliberately ignored here — the backend stays connected and the
    /// first `add`/`query` reports `CollectionNotInitialized` instead.
    pub async fn open(config: &Config) -> Self {
        match VectorBackend::connect(config).await {
            Ok(mut backend) => {
                let _ = backend.init_collection(&config.store.collection).await;
                RetrievalStore {
                    backend: Backend::Vector(backend),
                    fallback_reason: None,
                }
            }
            Err(Unavailable { reason }) => RetrievalStore {
                backend: Backend::Keyword(KeywordBackend::new()),
                fallback_reason: Some(reason),
            },
        }
    }

    /// Open a purely in-memory store without probing Qdrant
    pub fn in_memory() -> Self {
        RetrievalStore {
            backend: Backend::Keyword(KeywordBackend::new()),
            fallback_reason: None,
        }
    }

    /// Which backend is live
    pub fn kind(&self) -> BackendKind {
        match self.backend {
            Backend::Keyword(_) => BackendKind::Keyword,
            Backend::Vector(_) => BackendKind::Vector,
        }
    }

    /// Why the vector backend was skipped, if it was
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    /// Store a batch of documents through the active backend
    pub async fn add(
        &mut self,
        ids: Vec<String>,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        embeddings: Option<Vec<Vec<f32>>>,
    ) -> Result<()> {
        match &mut self.backend {
            Backend::Keyword(b) => b.add(ids, texts, metadatas, embeddings).await,
            Backend::Vector(b) => b.add(ids, texts, metadatas, embeddings).await,
        }
    }

    /// Search through the active backend
    pub async fn query(&self, query: &Query) -> Result<Vec<QueryResult>> {
        match &self.backend {
            Backend::Keyword(b) => b.query(query).await,
            Backend::Vector(b) => b.query(query).await,
        }
    }

    /// Number of stored documents
    pub async fn count(&self) -> Result<usize> {
        match &self.backend {
            Backend::Keyword(b) => Ok(b.len()),
            Backend::Vector(b) => b.count().await,
        }
    }
}

/// Reject misaligned batch columns before any mutation happens
pub(crate) fn check_batch(
    ids: &[String],
    texts: &[String],
    metadatas: Option<&Vec<Metadata>>,
    embeddings: Option<&Vec<Vec<f32>>>,
) -> Result<()> {
    let expected = ids.len();
    if texts.len() != expected {
        return Err(StoreError::MismatchedBatch {
            field: "texts",
            expected,
            actual: texts.len(),
        });
    }
    if let Some(metadatas) = metadatas {
        if metadatas.len() != expected {
            return Err(StoreError::MismatchedBatch {
                field: "metadatas",
                expected,
                actual: metadatas.len(),
            });
        }
    }
    if let Some(embeddings) = embeddings {
        if embeddings.len() != expected {
            return Err(StoreError::MismatchedBatch {
                field: "embeddings",
                expected,
                actual: embeddings.len(),
            });
        }
    }
    Ok(())
}
