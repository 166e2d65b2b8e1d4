//! mdrecall - markdown recall from the terminal
//!
//! Ingests markdown documents into a retrieval store and answers
//! interactive queries against them. The store facade picks between two
//! backends at startup: a Qdrant vector search adapter when the service is
//! reachable, and an in-memory keyword fallback otherwise. Both expose the
//! same `add`/`query` contract, so everything above the store is agnostic
//! to which one is live.

pub mod cli;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod ingest;
pub mod repl;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use errors::{Result, StoreError};
pub use store::{BackendKind, Query, QueryResult, RetrievalStore};
