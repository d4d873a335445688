//! Configuration for graph, vector, and model backends
//!
//! Loads configuration from an optional config.yml file with environment
//! variable overrides. The config is constructed explicitly and passed
//! down; there is no process-wide singleton.

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "config.yml";

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// How many passages the unstructured retriever returns.
pub const DEFAULT_VECTOR_TOP_K: usize = 4;
/// How many fuzzy-matched entity nodes a single lookup may return.
pub const DEFAULT_FULLTEXT_LIMIT: i64 = 2;
/// Cap on emitted relationship triples per matched-entity query.
pub const DEFAULT_TRIPLE_LIMIT: i64 = 50;
/// Name of the full-text entity index.
pub const DEFAULT_ENTITY_INDEX: &str = "entity";
/// Relationship types excluded from neighborhood expansion.
pub const DEFAULT_EXCLUDED_RELATIONSHIPS: &[&str] = &["MENTIONS"];

#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_username: String,
    pub neo4j_password: String,
    pub qdrant_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub retrieval: RetrievalConfig,
}

/// Tuning knobs for the retrieval pipeline.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub vector_top_k: usize,
    pub fulltext_limit: i64,
    pub triple_limit: i64,
    pub entity_index: String,
    pub excluded_relationships: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_top_k: DEFAULT_VECTOR_TOP_K,
            fulltext_limit: DEFAULT_FULLTEXT_LIMIT,
            triple_limit: DEFAULT_TRIPLE_LIMIT,
            entity_index: DEFAULT_ENTITY_INDEX.to_string(),
            excluded_relationships: DEFAULT_EXCLUDED_RELATIONSHIPS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// YAML config structures (all fields optional, env takes precedence)
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    neo4j: Option<Neo4jYaml>,
    qdrant: Option<QdrantYaml>,
    openai: Option<OpenAiYaml>,
    retrieval: Option<RetrievalYaml>,
}

#[derive(Debug, Default, Deserialize)]
struct Neo4jYaml {
    uri: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct QdrantYaml {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiYaml {
    chat_model: Option<String>,
    embedding_model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RetrievalYaml {
    vector_top_k: Option<usize>,
    fulltext_limit: Option<i64>,
    triple_limit: Option<i64>,
    entity_index: Option<String>,
    excluded_relationships: Option<Vec<String>>,
}

impl Config {
    /// Load from `config.yml` if present, otherwise from environment alone.
    pub fn load() -> Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)
        } else {
            Self::resolve(YamlConfig::default())
        }
    }

    /// Load from an explicit YAML file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let yaml: YamlConfig = serde_yaml::from_str(&content)?;
        Self::resolve(yaml)
    }

    fn resolve(yaml: YamlConfig) -> Result<Self> {
        let neo4j = yaml.neo4j.unwrap_or_default();
        let qdrant = yaml.qdrant.unwrap_or_default();
        let openai = yaml.openai.unwrap_or_default();
        let retrieval = yaml.retrieval.unwrap_or_default();

        let neo4j_uri = env_or("NEO4J_URI", neo4j.uri)
            .ok_or_else(|| Error::InvalidArgument("NEO4J_URI not set".to_string()))?;
        let neo4j_username = env_or("NEO4J_USERNAME", neo4j.username)
            .ok_or_else(|| Error::InvalidArgument("NEO4J_USERNAME not set".to_string()))?;
        let neo4j_password = env_or("NEO4J_PASSWORD", neo4j.password)
            .ok_or_else(|| Error::InvalidArgument("NEO4J_PASSWORD not set".to_string()))?;

        let defaults = RetrievalConfig::default();

        Ok(Self {
            neo4j_uri,
            neo4j_username,
            neo4j_password,
            qdrant_url: env_or("QDRANT_URL", qdrant.url)
                .unwrap_or_else(|| DEFAULT_QDRANT_URL.to_string()),
            chat_model: openai
                .chat_model
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embedding_model: openai
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            retrieval: RetrievalConfig {
                vector_top_k: retrieval.vector_top_k.unwrap_or(defaults.vector_top_k),
                fulltext_limit: retrieval.fulltext_limit.unwrap_or(defaults.fulltext_limit),
                triple_limit: retrieval.triple_limit.unwrap_or(defaults.triple_limit),
                entity_index: retrieval
                    .entity_index
                    .unwrap_or(defaults.entity_index),
                excluded_relationships: retrieval
                    .excluded_relationships
                    .unwrap_or(defaults.excluded_relationships),
            },
        })
    }
}

fn env_or(var: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty()).or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL_YAML: &str = r#"
neo4j:
  uri: bolt://localhost:7687
  username: neo4j
  password: secret
qdrant:
  url: http://localhost:7000
openai:
  chat_model: gpt-4o
retrieval:
  vector_top_k: 8
  excluded_relationships:
    - MENTIONS
    - CITES
"#;

    struct EnvGuard {
        vars: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn clear(names: &[&'static str]) -> Self {
            let vars = names
                .iter()
                .map(|name| {
                    let original = std::env::var(name).ok();
                    std::env::remove_var(name);
                    (*name, original)
                })
                .collect();
            Self { vars }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, original) in &self.vars {
                match original {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }

    #[test]
    fn retrieval_config_defaults() {
        let config = RetrievalConfig::default();

        assert_eq!(config.vector_top_k, 4);
        assert_eq!(config.fulltext_limit, 2);
        assert_eq!(config.triple_limit, 50);
        assert_eq!(config.entity_index, "entity");
        assert_eq!(config.excluded_relationships, vec!["MENTIONS".to_string()]);
    }

    #[test]
    fn from_file_reads_yaml_values() {
        let _guard = EnvGuard::clear(&[
            "NEO4J_URI",
            "NEO4J_USERNAME",
            "NEO4J_PASSWORD",
            "QDRANT_URL",
        ]);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL_YAML.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j_username, "neo4j");
        assert_eq!(config.qdrant_url, "http://localhost:7000");
        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.retrieval.vector_top_k, 8);
        assert_eq!(config.retrieval.triple_limit, 50);
        assert_eq!(
            config.retrieval.excluded_relationships,
            vec!["MENTIONS".to_string(), "CITES".to_string()]
        );
    }

    #[test]
    fn missing_neo4j_credentials_is_an_error() {
        let _guard = EnvGuard::clear(&["NEO4J_URI", "NEO4J_USERNAME", "NEO4J_PASSWORD"]);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"qdrant:\n  url: http://localhost:6334\n")
            .unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("NEO4J_URI"));
    }

    #[test]
    fn malformed_yaml_is_a_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"neo4j: [not, a, mapping").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::SerializationError(_)));
    }
}
