//! Prompt templates used by the retrieval pipeline.
//!
//! Templates live as Markdown files in the `prompts/` directory and are
//! embedded at compile time. Placeholders use `{name}` syntax and are
//! filled with plain string substitution.

/// Available prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Condense chat history + follow-up into a standalone question.
    CondenseQuestion,
    /// System prompt for person/organization entity extraction.
    EntityExtraction,
    /// Answer a question from the assembled retrieval context.
    Answer,
}

impl Prompt {
    /// Prompt file name (Markdown).
    pub fn filename(&self) -> &'static str {
        match self {
            Prompt::CondenseQuestion => "condense_question.md",
            Prompt::EntityExtraction => "entity_extraction.md",
            Prompt::Answer => "answer.md",
        }
    }

    /// Template text embedded from `prompts/`.
    pub fn template(&self) -> &'static str {
        match self {
            Prompt::CondenseQuestion => include_str!("../prompts/condense_question.md"),
            Prompt::EntityExtraction => include_str!("../prompts/entity_extraction.md"),
            Prompt::Answer => include_str!("../prompts/answer.md"),
        }
    }
}

/// List of all available prompts.
pub fn list_prompts() -> Vec<Prompt> {
    vec![
        Prompt::CondenseQuestion,
        Prompt::EntityExtraction,
        Prompt::Answer,
    ]
}
