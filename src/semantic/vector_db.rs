//! Vector database integration with Qdrant

use std::collections::HashMap;

use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use tracing::{debug, info};

use super::models::{Passage, ScoredPassage};
use crate::Result;

const COLLECTION_NAME: &str = "passages";

/// Passage store backed by Qdrant
pub struct PassageStore {
    client: Qdrant,
    dimension: usize,
}

impl PassageStore {
    /// Connect to Qdrant server
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build()?;

        Ok(Self {
            client,
            dimension: 1536, // text-embedding-3-small dimension
        })
    }

    /// Connect with custom dimension
    pub fn with_dimension(url: &str, dimension: usize) -> Result<Self> {
        let mut store = Self::new(url)?;
        store.dimension = dimension;
        Ok(store)
    }

    /// Initialize the collection if it doesn't exist
    pub async fn init_collection(&self) -> Result<()> {
        let collections = self.client.list_collections().await?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == COLLECTION_NAME);

        if !exists {
            info!("Creating collection '{}'", COLLECTION_NAME);

            self.client
                .create_collection(
                    CreateCollectionBuilder::new(COLLECTION_NAME).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await?;

            info!("Collection created successfully");
        } else {
            debug!("Collection '{}' already exists", COLLECTION_NAME);
        }

        Ok(())
    }

    /// Upsert embedded passages. Passages without an embedding are skipped.
    pub async fn upsert_passages(&self, passages: &[Passage]) -> Result<usize> {
        let points: Vec<PointStruct> = passages
            .iter()
            .filter_map(|passage| {
                let embedding = passage.embedding.as_ref()?;
                if embedding.is_empty() {
                    return None;
                }

                let mut payload: HashMap<String, QdrantValue> = HashMap::new();
                payload.insert("text".into(), passage.text.clone().into());
                payload.insert("source".into(), passage.source.clone().into());

                Some(PointStruct::new(
                    passage.id.to_string(),
                    embedding.clone(),
                    payload,
                ))
            })
            .collect();

        if points.is_empty() {
            return Ok(0);
        }

        let count = points.len();
        debug!("Upserting {} points to Qdrant", count);

        self.client
            .upsert_points(UpsertPointsBuilder::new(COLLECTION_NAME, points))
            .await?;

        info!("Successfully upserted {} passages", count);
        Ok(count)
    }

    /// Search for the passages most similar to a query embedding
    pub async fn search(
        &self,
        query_embedding: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPassage>> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(COLLECTION_NAME, query_embedding, limit)
                    .with_payload(true),
            )
            .await?;

        let passages: Vec<ScoredPassage> = results
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;
                Some(ScoredPassage {
                    text: payload.get("text")?.as_text()?.to_string(),
                    source: payload
                        .get("source")
                        .and_then(|v| v.as_text())
                        .unwrap_or_default()
                        .to_string(),
                    score: point.score,
                })
            })
            .collect();

        Ok(passages)
    }
}

trait QdrantValueExt {
    fn as_text(&self) -> Option<&str>;
}

impl QdrantValueExt for QdrantValue {
    fn as_text(&self) -> Option<&str> {
        match &self.kind {
            Some(qdrant_client::qdrant::value::Kind::StringValue(v)) => Some(v),
            _ => None,
        }
    }
}
