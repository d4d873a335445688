//! Unstructured retrieval: embeddings and vector similarity search.

pub mod embeddings;
pub mod models;
pub mod vector_db;

pub use embeddings::{embedding_dimension, EmbeddingService};
pub use models::{Passage, ScoredPassage};
pub use vector_db::PassageStore;

use async_trait::async_trait;
use tracing::debug;

use crate::retrieval::PassageSearch;
use crate::Result;

/// Embedder + passage store behind one similarity-search interface.
pub struct SemanticIndex {
    embedder: EmbeddingService,
    store: PassageStore,
}

impl SemanticIndex {
    pub fn new(embedder: EmbeddingService, store: PassageStore) -> Self {
        Self { embedder, store }
    }

    /// Embed passages in one batch and upsert them into the store.
    /// Returns the number of passages actually indexed.
    pub async fn index_passages(&self, passages: &mut [Passage]) -> Result<usize> {
        if passages.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        for (passage, embedding) in passages.iter_mut().zip(embeddings) {
            if !embedding.is_empty() {
                passage.embedding = Some(embedding);
            }
        }

        self.store.upsert_passages(passages).await
    }
}

#[async_trait]
impl PassageSearch for SemanticIndex {
    async fn similar_passages(&self, question: &str, top_k: usize) -> Result<Vec<ScoredPassage>> {
        let query_embedding = self.embedder.embed(question).await?;
        let passages = self.store.search(query_embedding, top_k as u64).await?;

        debug!("Similarity search returned {} passages", passages.len());
        Ok(passages)
    }
}
