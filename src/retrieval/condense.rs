//! Query normalization: collapse chat history + follow-up into one
//! standalone question.

use tracing::debug;

use super::LanguageModel;
use crate::integrations::ChatMessage;
use crate::prompts::Prompt;
use crate::Result;

/// One prior conversation exchange.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatTurn {
    pub human: String,
    pub assistant: String,
}

impl ChatTurn {
    pub fn new(human: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            assistant: assistant.into(),
        }
    }
}

/// Render history as alternating "Human:" / "AI:" lines.
pub fn render_history(history: &[ChatTurn]) -> String {
    let mut buffer = Vec::with_capacity(history.len() * 2);
    for turn in history {
        buffer.push(format!("Human: {}", turn.human));
        buffer.push(format!("AI: {}", turn.assistant));
    }
    buffer.join("\n")
}

/// Produce a standalone question. Empty history returns the question
/// unchanged without a model call; otherwise the model rewrites history +
/// follow-up into one self-contained question. Model failures propagate:
/// guessing a standalone question here would corrupt all downstream
/// retrieval.
pub async fn standalone_question<L: LanguageModel>(
    llm: &L,
    question: &str,
    history: &[ChatTurn],
) -> Result<String> {
    if history.is_empty() {
        return Ok(question.to_string());
    }

    let prompt = Prompt::CondenseQuestion
        .template()
        .replace("{chat_history}", &render_history(history))
        .replace("{question}", question);

    debug!("Condensing question with {} history turns", history.len());
    let condensed = llm.complete(vec![ChatMessage::user(prompt)]).await?;
    Ok(condensed.trim().to_string())
}
