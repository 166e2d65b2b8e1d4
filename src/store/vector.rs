//! Qdrant-backed vector store adapter
//!
//! Wraps the external Qdrant service behind the `RetrievalBackend`
//! contract. Construction probes the service once and reports a tagged
//! `Unavailable` failure for the facade to match on; after construction
//! every failure propagates to the caller.

use async_trait::async_trait;
use qdrant_client::{
    client::QdrantClient,
    qdrant::{
        point_id::PointIdOptions, value::Kind, vectors_config::Config as VectorsConfigKind,
        with_payload_selector::SelectorOptions, CreateCollection, Distance, PointStruct,
        SearchPoints, Value as QdrantValue, VectorParams, VectorsConfig, WithPayloadSelector,
    },
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use super::{check_batch, Metadata, Query, QueryResult, RetrievalBackend};
use crate::config::Config;
use crate::embedding::{Embedder, OllamaEmbedder};
use crate::errors::{Result, StoreError};

/// Payload key carrying the document text
const PAYLOAD_DOCUMENT: &str = "document";
/// Payload key carrying the caller's document id
const PAYLOAD_ID: &str = "id";

/// Tagged construction-time failure: the service cannot be used at all
///
/// Deliberately not `StoreError` so the facade's fallback match is total —
/// `connect` either hands back a working backend or this.
#[derive(Debug)]
pub struct Unavailable {
    pub reason: String,
}

impl From<Unavailable> for StoreError {
    fn from(unavailable: Unavailable) -> Self {
        StoreError::BackendUnavailable(unavailable.reason)
    }
}

/// Adapter over a Qdrant collection
///
/// Embeddings come from the caller or, when absent, from the configured
/// `Embedder`. Qdrant point ids must be uuids or integers, so the caller's
/// id is digested to a UUIDv5 and the original rides in the payload.
pub struct VectorBackend {
    client: QdrantClient,
    embedder: Box<dyn Embedder>,
    collection: Option<String>,
    data_dir: Option<PathBuf>,
}

impl VectorBackend {
    /// Build the client and probe the service once
    ///
    /// A configured data directory is created up front so a locally run
    /// Qdrant can be pointed at it. Any failure here means the backend is
    /// unusable and the caller should fall back.
    pub async fn connect(config: &Config) -> std::result::Result<Self, Unavailable> {
        if let Some(dir) = &config.store.data_dir {
            fs::create_dir_all(dir).map_err(|e| Unavailable {
                reason: format!("cannot create data dir {}: {e}", dir.display()),
            })?;
        }

        let client = QdrantClient::from_url(&config.store.qdrant_url)
            .build()
            .map_err(|e| Unavailable {
                reason: format!("cannot build Qdrant client: {e}"),
            })?;

        // Reachability probe; from_url alone never touches the network
        client.list_collections().await.map_err(|e| Unavailable {
            reason: format!("Qdrant not reachable at {}: {e}", config.store.qdrant_url),
        })?;

        Ok(VectorBackend {
            client,
            embedder: Box::new(OllamaEmbedder::new(&config.embedding)),
            collection: None,
            data_dir: config.store.data_dir.clone(),
        })
    }

    /// Fetch or create the named collection; safe to call repeatedly
    pub async fn init_collection(&mut self, name: &str) -> Result<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| StoreError::VectorRequest(e.to_string()))?;

        let exists = collections.collections.iter().any(|c| c.name == name);

        if !exists {
            self.client
                .create_collection(&CreateCollection {
                    collection_name: name.to_string(),
                    vectors_config: Some(VectorsConfig {
                        config: Some(VectorsConfigKind::Params(VectorParams {
                            size: self.embedder.dimension() as u64,
                            distance: Distance::Cosine.into(),
                            ..Default::default()
                        })),
                    }),
                    ..Default::default()
                })
                .await
                .map_err(|e| StoreError::VectorRequest(e.to_string()))?;
        }

        self.collection = Some(name.to_string());
        Ok(())
    }

    /// Number of points in the collection
    pub async fn count(&self) -> Result<usize> {
        let collection = self.collection_name()?;
        let info = self
            .client
            .collection_info(collection)
            .await
            .map_err(|e| StoreError::VectorRequest(e.to_string()))?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0) as usize)
    }

    /// Where the service was told to keep its index, if anywhere
    pub fn data_dir(&self) -> Option<&PathBuf> {
        self.data_dir.as_ref()
    }

    fn collection_name(&self) -> Result<&str> {
        self.collection
            .as_deref()
            .ok_or(StoreError::CollectionNotInitialized)
    }
}

#[async_trait]
impl RetrievalBackend for VectorBackend {
    async fn add(
        &mut self,
        ids: Vec<String>,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        embeddings: Option<Vec<Vec<f32>>>,
    ) -> Result<()> {
        let collection = self.collection_name()?.to_string();
        check_batch(&ids, &texts, metadatas.as_ref(), embeddings.as_ref())?;

        let embeddings = match embeddings {
            Some(embeddings) => embeddings,
            None => self.embedder.embed_batch(&texts).await?,
        };
        let metadatas = metadatas.unwrap_or_else(|| vec![Metadata::new(); ids.len()]);

        let points: Vec<PointStruct> = ids
            .into_iter()
            .zip(texts)
            .zip(metadatas)
            .zip(embeddings)
            .map(|(((id, text), metadata), embedding)| {
                let mut payload: HashMap<String, QdrantValue> = metadata
                    .into_iter()
                    .map(|(key, value)| (key, payload_value(value)))
                    .collect();
                payload.insert(PAYLOAD_ID.to_string(), QdrantValue::from(id.clone()));
                payload.insert(PAYLOAD_DOCUMENT.to_string(), QdrantValue::from(text));
                PointStruct::new(point_id_for(&id), embedding, payload)
            })
            .collect();

        self.client
            .upsert_points_blocking(&collection, None, points, None)
            .await
            .map_err(|e| StoreError::VectorRequest(e.to_string()))?;

        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<QueryResult>> {
        let collection = self.collection_name()?.to_string();

        // Precomputed embedding wins; text gets embedded; neither is a
        // quiet no-op that never reaches the service.
        let vector = match (&query.embedding, &query.text) {
            (Some(embedding), _) => embedding.clone(),
            (None, Some(text)) => self.embedder.embed(text).await?,
            (None, None) => return Ok(Vec::new()),
        };

        let search = self
            .client
            .search_points(&SearchPoints {
                collection_name: collection,
                vector,
                limit: query.n_results as u64,
                with_payload: Some(WithPayloadSelector {
                    selector_options: Some(SelectorOptions::Enable(true)),
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| StoreError::VectorRequest(e.to_string()))?;

        let results = search
            .result
            .into_iter()
            .map(|point| {
                let mut payload = point.payload;

                let text = payload
                    .remove(PAYLOAD_DOCUMENT)
                    .and_then(|v| string_value(&v))
                    .unwrap_or_default();
                let id = payload
                    .remove(PAYLOAD_ID)
                    .and_then(|v| string_value(&v))
                    .unwrap_or_else(|| point_id_string(&point.id));

                let metadata: Metadata = payload
                    .into_iter()
                    .filter_map(|(key, value)| json_value(&value).map(|v| (key, v)))
                    .collect();

                QueryResult {
                    id,
                    text,
                    metadata,
                    // Qdrant reports cosine similarity; the contract wants a
                    // distance, smaller = more similar.
                    score: 1.0 - point.score,
                }
            })
            .collect();

        Ok(results)
    }
}

/// Deterministic Qdrant point id for a caller-supplied document id
fn point_id_for(id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes()).to_string()
}

fn payload_value(json: JsonValue) -> QdrantValue {
    match json {
        JsonValue::String(s) => QdrantValue::from(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                QdrantValue::from(i)
            } else if let Some(f) = n.as_f64() {
                QdrantValue::from(f)
            } else {
                QdrantValue::from(0)
            }
        }
        JsonValue::Bool(b) => QdrantValue::from(b),
        // Nested structures are out of scope for document metadata
        _ => QdrantValue::from(""),
    }
}

fn json_value(value: &QdrantValue) -> Option<JsonValue> {
    value.kind.as_ref().and_then(|kind| match kind {
        Kind::StringValue(s) => Some(JsonValue::String(s.clone())),
        Kind::IntegerValue(i) => Some(JsonValue::Number((*i).into())),
        Kind::DoubleValue(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
        Kind::BoolValue(b) => Some(JsonValue::Bool(*b)),
        _ => None,
    })
}

fn string_value(value: &QdrantValue) -> Option<String> {
    value.kind.as_ref().and_then(|kind| match kind {
        Kind::StringValue(s) => Some(s.clone()),
        _ => None,
    })
}

fn point_id_string(point_id: &Option<qdrant_client::qdrant::PointId>) -> String {
    point_id
        .as_ref()
        .map(|id| match &id.point_id_options {
            Some(PointIdOptions::Num(n)) => n.to_string(),
            Some(PointIdOptions::Uuid(u)) => u.clone(),
            None => "unknown".to_string(),
        })
        .unwrap_or_else(|| "unknown".to_string())
}
