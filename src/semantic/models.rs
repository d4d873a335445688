//! Data types for the unstructured retrieval side.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk of unstructured source text, optionally with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    pub id: Uuid,
    pub text: String,
    pub source: String,
    /// Set once the text has been embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Passage {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source: source.into(),
            embedding: None,
        }
    }
}

/// A passage returned by similarity search.
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub text: String,
    pub source: String,
    pub score: f32,
}
