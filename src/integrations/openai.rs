//! OpenAI chat-completion client for question condensation, entity
//! extraction (structured output), and answer generation.

use std::env;

use reqwest::Client;
use schemars::{schema_for, JsonSchema};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::DEFAULT_CHAT_MODEL;
use crate::retrieval::entities::extraction_messages;
use crate::retrieval::{ExtractedEntities, LanguageModel};
use crate::{Error, Result};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_TOKENS: u32 = 1024;
/// Deterministic output for retrieval plumbing.
const TEMPERATURE: f32 = 0.0;

/// OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIClient {
    /// Create client from environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| Error::InvalidArgument("OPENAI_API_KEY not set".to_string()))?;
        Self::new(api_key)
    }

    /// Create client with API key.
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidArgument("OPENAI_API_KEY empty".to_string()));
        }

        let http = Client::builder()
            .user_agent("graph_rag/0.1.0")
            .build()
            .map_err(|e| Error::InvalidArgument(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: OPENAI_API_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
        })
    }

    /// Override the default chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (used by tests against a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Chat completion returning free text.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens,
            response_format: None,
        };

        self.send(request).await
    }

    /// Chat completion constrained to a JSON schema derived from `T`.
    /// A response that cannot be parsed as `T` is a `MalformedOutput` error.
    pub async fn structured_completion<T>(
        &self,
        messages: Vec<ChatMessage>,
        schema_name: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            response_format: Some(response_format::<T>(schema_name)?),
        };

        let content = self.send(request).await?;
        serde_json::from_str(&content).map_err(|e| Error::MalformedOutput(e.to_string()))
    }

    async fn send(&self, request: ChatRequest) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::OpenAiError(format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::OpenAiError(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::OpenAiError(format!("{}: {}", status, text)));
        }

        let chat_response: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::OpenAiError(format!("invalid response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::OpenAiError("empty response".to_string()))
    }
}

#[async_trait::async_trait]
impl LanguageModel for OpenAIClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.chat_completion(messages, &self.model, TEMPERATURE, DEFAULT_MAX_TOKENS)
            .await
    }

    async fn extract_entities(&self, question: &str) -> Result<Vec<String>> {
        let entities: ExtractedEntities = self
            .structured_completion(extraction_messages(question), "entities")
            .await?;

        debug!("Extracted {} entities", entities.names.len());
        Ok(entities.names)
    }
}

/// Build an OpenAI `response_format` object from a schemars-derived schema.
fn response_format<T: JsonSchema>(name: &str) -> Result<Value> {
    let mut schema = serde_json::to_value(schema_for!(T))?;
    close_objects(&mut schema);

    Ok(json!({
        "type": "json_schema",
        "json_schema": {
            "name": name,
            "strict": true,
            "schema": schema,
        }
    }))
}

/// Strict mode requires `additionalProperties: false` on every object.
fn close_objects(value: &mut Value) {
    if let Value::Object(map) = value {
        if map.contains_key("properties") {
            map.insert("additionalProperties".to_string(), Value::Bool(false));
        }
        for child in map.values_mut() {
            close_objects(child);
        }
    } else if let Value::Array(items) = value {
        for child in items {
            close_objects(child);
        }
    }
}

/// One chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> OpenAIClient {
        OpenAIClient::new("test_key")
            .unwrap()
            .with_base_url(server.base_url())
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(OpenAIClient::new("  ").is_err());
        assert!(OpenAIClient::new("key").is_ok());
    }

    #[test]
    fn response_format_closes_objects() {
        let format = response_format::<ExtractedEntities>("entities").unwrap();

        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "entities");
        assert_eq!(format["json_schema"]["strict"], true);

        let schema = &format["json_schema"]["schema"];
        assert_eq!(schema["additionalProperties"], false);
        assert!(schema["properties"]["names"].is_object());
        assert_eq!(schema["required"][0], "names");
    }

    #[tokio::test]
    async fn chat_completion_returns_first_choice_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(serde_json::json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "Augustus became emperor in 27 BC."}}
                    ]
                }));
            })
            .await;

        let client = client_for(&server);
        let answer = client
            .chat_completion(
                vec![ChatMessage::user("When did Augustus become emperor?")],
                "gpt-4o-mini",
                0.0,
                256,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(answer, "Augustus became emperor in 27 BC.");
    }

    #[tokio::test]
    async fn http_errors_surface_as_openai_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let client = client_for(&server);
        let err = client
            .chat_completion(vec![ChatMessage::user("hi")], "gpt-4o-mini", 0.0, 16)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::OpenAiError(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn structured_completion_parses_schema_output() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .json_body_partial(r#"{"response_format": {"type": "json_schema"}}"#);
                then.status(200).json_body(serde_json::json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "{\"names\": [\"Aurelian\"]}"}}
                    ]
                }));
            })
            .await;

        let client = client_for(&server);
        let entities: ExtractedEntities = client
            .structured_completion(extraction_messages("Who is Aurelian?"), "entities")
            .await
            .unwrap();

        assert_eq!(entities.names, vec!["Aurelian".to_string()]);
    }

    #[tokio::test]
    async fn malformed_structured_output_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(serde_json::json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "not json at all"}}
                    ]
                }));
            })
            .await;

        let client = client_for(&server);
        let err = client
            .structured_completion::<ExtractedEntities>(
                extraction_messages("Who is Aurelian?"),
                "entities",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn extract_entities_returns_names_via_trait() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(serde_json::json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "{\"names\": [\"Julius Caesar\", \"Rome\"]}"}}
                    ]
                }));
            })
            .await;

        let client = client_for(&server);
        let names = client
            .extract_entities("What did Julius Caesar do in Rome?")
            .await
            .unwrap();

        assert_eq!(
            names,
            vec!["Julius Caesar".to_string(), "Rome".to_string()]
        );
    }
}
