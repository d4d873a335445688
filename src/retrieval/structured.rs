//! Structured retrieval: entity neighborhood collection from the graph.

use tracing::debug;

use super::{EntityNeighbors, LanguageModel};
use crate::graph::fulltext_query;
use crate::Result;

/// Collect the graph neighborhood of every entity mentioned in the
/// question, as one newline-joined block of relationship triples.
///
/// Entities with no usable query term or no fuzzy matches contribute
/// nothing; zero extracted entities produce an empty string. Lookups run
/// sequentially per entity, preserving extraction order in the output.
pub async fn structured_context<L, G>(llm: &L, graph: &G, question: &str) -> Result<String>
where
    L: LanguageModel,
    G: EntityNeighbors,
{
    let names = llm.extract_entities(question).await?;
    if names.is_empty() {
        debug!("No entities extracted from question");
        return Ok(String::new());
    }

    let mut triples: Vec<String> = Vec::new();
    for name in &names {
        let Some(term) = fulltext_query(name) else {
            continue;
        };

        debug!("Getting entity '{}' with term '{}'", name, term);
        triples.extend(graph.neighborhood(&term).await?);
    }

    Ok(triples.join("\n"))
}
