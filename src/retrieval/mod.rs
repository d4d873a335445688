//! Hybrid retrieval pipeline
//!
//! Four stages, each feeding the next: question condensation, entity
//! extraction, structured graph retrieval, and vector similarity search,
//! followed by context assembly and answer generation. The graph, vector,
//! and model backends sit behind capability traits so the pipeline can be
//! driven by injected clients.

pub mod condense;
pub mod context;
pub mod entities;
pub mod structured;

pub use condense::{render_history, standalone_question, ChatTurn};
pub use context::{assemble_context, RetrievalContext, DOCUMENT_SEPARATOR};
pub use entities::ExtractedEntities;
pub use structured::structured_context;

use async_trait::async_trait;
use tracing::info;

use crate::config::DEFAULT_VECTOR_TOP_K;
use crate::integrations::ChatMessage;
use crate::prompts::Prompt;
use crate::semantic::ScoredPassage;
use crate::Result;

/// Chat-completion backend: free-text completion plus schema-constrained
/// entity extraction.
#[async_trait]
pub trait LanguageModel {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Extract person/organization names from a question. No entities is
    /// a valid outcome, not an error.
    async fn extract_entities(&self, question: &str) -> Result<Vec<String>>;
}

/// Graph backend: fuzzy full-text entity lookup + one-hop neighborhood
/// expansion, returning formatted relationship triples.
#[async_trait]
pub trait EntityNeighbors {
    async fn neighborhood(&self, term: &str) -> Result<Vec<String>>;
}

/// Vector backend: top-k passages by similarity to the question.
#[async_trait]
pub trait PassageSearch {
    async fn similar_passages(&self, question: &str, top_k: usize) -> Result<Vec<ScoredPassage>>;
}

#[derive(Debug, Clone)]
pub struct RetrieverOptions {
    /// How many passages the unstructured retriever returns.
    pub vector_top_k: usize,
}

impl Default for RetrieverOptions {
    fn default() -> Self {
        Self {
            vector_top_k: DEFAULT_VECTOR_TOP_K,
        }
    }
}

/// The hybrid retriever. Stateless across queries; each invocation runs
/// the stages sequentially against the injected backends.
pub struct Retriever<G, P, L> {
    graph: G,
    passages: P,
    llm: L,
    options: RetrieverOptions,
}

impl<G, P, L> Retriever<G, P, L>
where
    G: EntityNeighbors,
    P: PassageSearch,
    L: LanguageModel,
{
    pub fn new(graph: G, passages: P, llm: L) -> Self {
        Self::with_options(graph, passages, llm, RetrieverOptions::default())
    }

    pub fn with_options(graph: G, passages: P, llm: L, options: RetrieverOptions) -> Self {
        Self {
            graph,
            passages,
            llm,
            options,
        }
    }

    /// Condense chat history + follow-up into one standalone question.
    pub async fn standalone_question(
        &self,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<String> {
        condense::standalone_question(&self.llm, question, history).await
    }

    /// Relationship triples for every entity mentioned in the question.
    pub async fn structured_context(&self, question: &str) -> Result<String> {
        structured::structured_context(&self.llm, &self.graph, question).await
    }

    /// Top-k passages by vector similarity.
    pub async fn unstructured_context(&self, question: &str) -> Result<Vec<ScoredPassage>> {
        self.passages
            .similar_passages(question, self.options.vector_top_k)
            .await
    }

    /// Run the full retrieval pipeline for a question.
    pub async fn retrieve(
        &self,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<RetrievalContext> {
        let question = self.standalone_question(question, history).await?;
        info!("Search query: {}", question);

        let structured = self.structured_context(&question).await?;
        let scored = self.unstructured_context(&question).await?;
        let passages = scored.into_iter().map(|p| p.text).collect();

        Ok(RetrievalContext {
            question,
            structured,
            passages,
        })
    }

    /// Generate an answer from an assembled context.
    pub async fn answer(&self, context: &RetrievalContext) -> Result<String> {
        let prompt = Prompt::Answer
            .template()
            .replace("{context}", &context.render())
            .replace("{question}", &context.question);

        self.llm.complete(vec![ChatMessage::user(prompt)]).await
    }

    /// Retrieve and answer in one call.
    pub async fn ask(&self, question: &str, history: &[ChatTurn]) -> Result<String> {
        let context = self.retrieve(question, history).await?;
        self.answer(&context).await
    }
}
