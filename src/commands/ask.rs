//! Answer a question with hybrid graph + vector retrieval.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::graph::{GraphStore, NeighborhoodOptions};
use crate::integrations::OpenAIClient;
use crate::retrieval::{ChatTurn, Retriever, RetrieverOptions};
use crate::semantic::{embedding_dimension, EmbeddingService, PassageStore, SemanticIndex};

pub async fn run(
    config: &Config,
    question: &str,
    history_path: Option<&Path>,
    show_context: bool,
) -> Result<()> {
    let history = match history_path {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };

    let graph = GraphStore::connect(
        &config.neo4j_uri,
        &config.neo4j_username,
        &config.neo4j_password,
    )
    .await?
    .with_options(NeighborhoodOptions::from(&config.retrieval));

    let embedder = EmbeddingService::with_model(&config.embedding_model)?;
    let store = PassageStore::with_dimension(
        &config.qdrant_url,
        embedding_dimension(&config.embedding_model),
    )?;
    let semantic = SemanticIndex::new(embedder, store);

    let llm = OpenAIClient::from_env()?.with_model(&config.chat_model);

    let retriever = Retriever::with_options(
        graph,
        semantic,
        llm,
        RetrieverOptions {
            vector_top_k: config.retrieval.vector_top_k,
        },
    );

    let context = retriever.retrieve(question, &history).await?;
    info!(
        "Retrieved {} structured bytes, {} passages",
        context.structured.len(),
        context.passages.len()
    );

    if show_context {
        println!("{}\n", context.render());
    }

    let answer = retriever.answer(&context).await?;
    println!("{answer}");

    Ok(())
}

/// Load prior conversation turns from a YAML file.
pub fn load_history(path: &Path) -> Result<Vec<ChatTurn>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history file {}", path.display()))?;
    let turns: Vec<ChatTurn> =
        serde_yaml::from_str(&content).context("history file is not a list of turns")?;
    Ok(turns)
}
