//! Seed the graph and passage store from a YAML file.
//!
//! Entity nodes are merged with the base `__Entity__` label plus their
//! own label; passages become `Document` nodes linked to the entities
//! they mention via `MENTIONS` edges, and their texts are embedded and
//! upserted into the vector store.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::config::Config;
use crate::graph::{GraphStore, NeighborhoodOptions};
use crate::semantic::{
    embedding_dimension, EmbeddingService, Passage, PassageStore, SemanticIndex,
};

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub entities: Vec<SeedEntity>,
    #[serde(default)]
    pub relationships: Vec<SeedRelationship>,
    #[serde(default)]
    pub passages: Vec<SeedPassage>,
}

#[derive(Debug, Deserialize)]
pub struct SeedEntity {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedRelationship {
    pub source: String,
    #[serde(rename = "type")]
    pub relationship: String,
    pub target: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedPassage {
    pub source: String,
    pub text: String,
    /// Entity ids this passage mentions.
    #[serde(default)]
    pub mentions: Vec<String>,
}

pub async fn run(config: &Config, path: &Path) -> Result<()> {
    let seed = load_seed(path)?;
    info!(
        "Seeding {} entities, {} relationships, {} passages",
        seed.entities.len(),
        seed.relationships.len(),
        seed.passages.len()
    );

    let graph = GraphStore::connect(
        &config.neo4j_uri,
        &config.neo4j_username,
        &config.neo4j_password,
    )
    .await?
    .with_options(NeighborhoodOptions::from(&config.retrieval));

    graph.ensure_entity_index().await?;

    for entity in &seed.entities {
        graph.merge_entity(&entity.id, &entity.label).await?;
    }

    for relationship in &seed.relationships {
        graph
            .merge_relationship(
                &relationship.source,
                &relationship.relationship,
                &relationship.target,
            )
            .await?;
    }

    let mut passages: Vec<Passage> = seed
        .passages
        .iter()
        .map(|p| Passage::new(&p.text, &p.source))
        .collect();

    for (seed_passage, passage) in seed.passages.iter().zip(&passages) {
        let document_id = passage.id.to_string();
        graph
            .merge_document(&document_id, &seed_passage.source, &seed_passage.text)
            .await?;

        for entity_id in &seed_passage.mentions {
            graph.link_mention(&document_id, entity_id).await?;
        }
    }

    let embedder = EmbeddingService::with_model(&config.embedding_model)?;
    let store = PassageStore::with_dimension(
        &config.qdrant_url,
        embedding_dimension(&config.embedding_model),
    )?;
    store.init_collection().await?;

    let semantic = SemanticIndex::new(embedder, store);
    let indexed = semantic.index_passages(&mut passages).await?;
    info!("Indexed {} passages", indexed);

    Ok(())
}

pub fn load_seed(path: &Path) -> Result<SeedFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let seed: SeedFile = serde_yaml::from_str(&content).context("malformed seed file")?;
    Ok(seed)
}
