//! Context assembly: structured triples + unstructured passages in one
//! prompt context.

/// Marker placed between passages in the unstructured section.
pub const DOCUMENT_SEPARATOR: &str = "#Document ";

pub const STRUCTURED_HEADER: &str = "Structured data:";
pub const UNSTRUCTURED_HEADER: &str = "Unstructured data:";

/// Everything retrieved for one question. Built fresh per query, never
/// cached.
#[derive(Debug, Clone)]
pub struct RetrievalContext {
    /// The standalone question the retrieval ran against.
    pub question: String,
    /// Newline-joined relationship triples.
    pub structured: String,
    /// Passage texts in similarity order.
    pub passages: Vec<String>,
}

impl RetrievalContext {
    pub fn render(&self) -> String {
        assemble_context(&self.structured, &self.passages)
    }
}

/// Pure, deterministic assembly of the final context block.
pub fn assemble_context(structured: &str, passages: &[String]) -> String {
    format!(
        "{STRUCTURED_HEADER}\n{structured}\n{UNSTRUCTURED_HEADER}\n{}",
        passages.join(DOCUMENT_SEPARATOR)
    )
}
