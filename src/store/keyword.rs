//! In-memory keyword fallback backend
//!
//! Used whenever the Qdrant service is unreachable. Keeps every document in
//! insertion order and scores a query by counting how many of its
//! whitespace-separated tokens occur in the document text. Matching is
//! substring containment, not whole-token equality, so "green" matches
//! "greenhouse" — partial-word hits are part of the contract.

use async_trait::async_trait;

use super::{check_batch, Metadata, Query, QueryResult, RetrievalBackend};
use crate::errors::Result;

struct StoredDocument {
    id: String,
    text: String,
    metadata: Metadata,
}

/// Linear-scan keyword backend
///
/// No deduplication: adding the same id twice stores two entries and both
/// are retrievable.
#[derive(Default)]
pub struct KeywordBackend {
    docs: Vec<StoredDocument>,
}

impl KeywordBackend {
    pub fn new() -> Self {
        KeywordBackend::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn score(query_tokens: &[String], text: &str) -> usize {
        let haystack = text.to_lowercase();
        query_tokens
            .iter()
            .filter(|token| haystack.contains(token.as_str()))
            .count()
    }
}

#[async_trait]
impl RetrievalBackend for KeywordBackend {
    async fn add(
        &mut self,
        ids: Vec<String>,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        embeddings: Option<Vec<Vec<f32>>>,
    ) -> Result<()> {
        check_batch(&ids, &texts, metadatas.as_ref(), embeddings.as_ref())?;

        // Embeddings are accepted for interface parity but not used here.
        let metadatas = metadatas.unwrap_or_else(|| vec![Metadata::new(); ids.len()]);
        for ((id, text), metadata) in ids.into_iter().zip(texts).zip(metadatas) {
            self.docs.push(StoredDocument { id, text, metadata });
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<QueryResult>> {
        let text = match &query.text {
            Some(text) => text,
            None => return Ok(Vec::new()),
        };

        let query_tokens: Vec<String> = text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let mut scored: Vec<(usize, &StoredDocument)> = self
            .docs
            .iter()
            .map(|doc| (Self::score(&query_tokens, &doc.text), doc))
            .collect();

        // Stable sort: equal scores keep insertion order, which callers
        // observe and rely on.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(query.n_results);

        Ok(scored
            .into_iter()
            .map(|(score, doc)| QueryResult {
                id: doc.id.clone(),
                text: doc.text.clone(),
                metadata: doc.metadata.clone(),
                score: score as f32,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use quickcheck_macros::quickcheck;

    async fn backend_with(docs: &[(&str, &str)]) -> KeywordBackend {
        let mut backend = KeywordBackend::new();
        let ids = docs.iter().map(|(id, _)| id.to_string()).collect();
        let texts = docs.iter().map(|(_, text)| text.to_string()).collect();
        backend.add(ids, texts, None, None).await.unwrap();
        backend
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty() {
        let backend = KeywordBackend::new();
        let results = backend.query(&Query::text("anything")).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_single_match_scores_one() {
        let backend = backend_with(&[("d1", "hello world")]).await;
        let results = backend.query(&Query::text("hello").with_limit(1)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "d1");
        assert_eq!(results[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_substring_containment_matches() {
        // "green" must hit "greenhouse": containment, not token equality
        let backend = backend_with(&[("d2", "greenhouse")]).await;
        let results = backend.query(&Query::text("green")).await.unwrap();
        assert_eq!(results[0].id, "d2");
        assert_eq!(results[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_case_insensitive_scoring() {
        let backend = backend_with(&[("d1", "Rust Memory Safety")]).await;
        let results = backend.query(&Query::text("MEMORY rust")).await.unwrap();
        assert_eq!(results[0].score, 2.0);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let backend = backend_with(&[
            ("first", "apple pie"),
            ("second", "apple tart"),
            ("third", "apple crumble"),
        ])
        .await;
        let results = backend.query(&Query::text("apple")).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_better_score_ranks_first() {
        let backend = backend_with(&[
            ("weak", "only apples here"),
            ("strong", "apples and oranges together"),
        ])
        .await;
        let results = backend.query(&Query::text("apples oranges")).await.unwrap();
        assert_eq!(results[0].id, "strong");
        assert_eq!(results[0].score, 2.0);
        assert_eq!(results[1].id, "weak");
        assert_eq!(results[1].score, 1.0);
    }

    #[tokio::test]
    async fn test_truncates_to_limit() {
        let backend = backend_with(&[
            ("a", "apple one"),
            ("b", "apple two"),
            ("c", "apple three"),
            ("d", "apple four"),
        ])
        .await;
        let results = backend.query(&Query::text("apple").with_limit(2)).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_add_visible_to_next_query() {
        let mut backend = backend_with(&[("old", "nothing relevant")]).await;
        backend
            .add(
                vec!["fresh".to_string()],
                vec!["matching words".to_string()],
                None,
                None,
            )
            .await
            .unwrap();
        let results = backend.query(&Query::text("matching").with_limit(1)).await.unwrap();
        assert_eq!(results[0].id, "fresh");
    }

    #[tokio::test]
    async fn test_duplicate_ids_both_kept() {
        let backend = backend_with(&[("dup", "apple one"), ("dup", "apple two")]).await;
        assert_eq!(backend.len(), 2);
        let results = backend.query(&Query::text("apple")).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.id == "dup"));
    }

    #[tokio::test]
    async fn test_metadata_defaults_to_empty() {
        let backend = backend_with(&[("d1", "hello")]).await;
        let results = backend.query(&Query::text("hello")).await.unwrap();
        assert!(results[0].metadata.is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_lengths_rejected_without_mutation() {
        let mut backend = KeywordBackend::new();
        let err = backend
            .add(
                vec!["a".to_string(), "b".to_string()],
                vec!["only one text".to_string()],
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MismatchedBatch { .. }));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_query_without_text_is_empty() {
        let backend = backend_with(&[("d1", "hello")]).await;
        let results = backend.query(&Query::embedding(vec![0.1])).await.unwrap();
        assert!(results.is_empty());
    }

    #[quickcheck]
    fn prop_never_exceeds_limit(texts: Vec<String>, query: String, n_results: usize) -> bool {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let mut backend = KeywordBackend::new();
            let ids = (0..texts.len()).map(|i| format!("doc-{i}")).collect();
            backend.add(ids, texts, None, None).await.unwrap();
            let results = backend
                .query(&Query::text(query).with_limit(n_results))
                .await
                .unwrap();
            results.len() <= n_results
        })
    }
}
