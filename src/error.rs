//! Error types for the hybrid retriever

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Graph database error: {0}")]
    GraphError(String),

    #[error("Vector database error: {0}")]
    VectorDbError(String),

    #[error("OpenAI API error: {0}")]
    OpenAiError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Structured output did not match schema: {0}")]
    MalformedOutput(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<neo4rs::Error> for Error {
    fn from(err: neo4rs::Error) -> Self {
        Error::GraphError(err.to_string())
    }
}

impl From<neo4rs::DeError> for Error {
    fn from(err: neo4rs::DeError) -> Self {
        Error::GraphError(err.to_string())
    }
}

impl From<qdrant_client::QdrantError> for Error {
    fn from(err: qdrant_client::QdrantError) -> Self {
        Error::VectorDbError(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for Error {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Error::OpenAiError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}
