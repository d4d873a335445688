//! One-time backend setup: full-text entity index + passage collection.

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::graph::{GraphStore, NeighborhoodOptions};
use crate::semantic::{embedding_dimension, PassageStore};

pub async fn run(config: &Config) -> Result<()> {
    let graph = GraphStore::connect(
        &config.neo4j_uri,
        &config.neo4j_username,
        &config.neo4j_password,
    )
    .await?
    .with_options(NeighborhoodOptions::from(&config.retrieval));

    graph.ensure_entity_index().await?;
    let nodes = graph.node_count().await?;
    info!("Graph ready ({} nodes)", nodes);

    let store = PassageStore::with_dimension(
        &config.qdrant_url,
        embedding_dimension(&config.embedding_model),
    )?;
    store.init_collection().await?;
    info!("Vector collection ready");

    Ok(())
}
