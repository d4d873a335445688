//! Entity extraction schema and prompt assembly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::integrations::ChatMessage;
use crate::prompts::Prompt;

/// Structured-output schema for entity extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedEntities {
    /// All the person, organization, or business entities that appear in
    /// the text.
    pub names: Vec<String>,
}

/// Messages for an entity-extraction call over one question.
pub fn extraction_messages(question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(Prompt::EntityExtraction.template().trim()),
        ChatMessage::user(format!(
            "Use the given format to extract information from the following input: {question}"
        )),
    ]
}
