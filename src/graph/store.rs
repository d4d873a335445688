//! Neo4j-backed entity graph access
//!
//! Wraps the `neo4rs` driver with the two operations the retriever
//! consumes (fuzzy full-text entity lookup, one-hop neighborhood
//! expansion) plus the write helpers used by the `setup` and `seed`
//! commands.

use async_trait::async_trait;
use neo4rs::{query, Graph};
use tracing::{debug, info};

use crate::config::RetrievalConfig;
use crate::retrieval::EntityNeighbors;
use crate::{Error, Result};

/// Fuzzy lookup + traversal for one query term. Fetches the best-matching
/// entity nodes from the full-text index, then walks one hop in both
/// directions around each match, skipping excluded relationship types.
const NEIGHBORHOOD_QUERY: &str = "\
CALL db.index.fulltext.queryNodes($index, $term, {limit: $match_limit})
YIELD node, score
CALL {
    WITH node
    MATCH (node)-[r]->(neighbor)
    WHERE NOT type(r) IN $excluded
    RETURN node.id + ' - ' + type(r) + ' -> ' + neighbor.id AS output
    UNION ALL
    WITH node
    MATCH (node)<-[r]-(neighbor)
    WHERE NOT type(r) IN $excluded
    RETURN neighbor.id + ' - ' + type(r) + ' -> ' + node.id AS output
}
RETURN output LIMIT $triple_limit";

/// Knobs for the neighborhood query.
#[derive(Debug, Clone)]
pub struct NeighborhoodOptions {
    /// Name of the full-text entity index.
    pub entity_index: String,
    /// Max fuzzy-matched nodes per query term.
    pub match_limit: i64,
    /// Max emitted triples per matched-entity query.
    pub triple_limit: i64,
    /// Relationship types excluded from expansion (provenance edges).
    pub excluded_relationships: Vec<String>,
}

impl Default for NeighborhoodOptions {
    fn default() -> Self {
        let config = RetrievalConfig::default();
        Self::from(&config)
    }
}

impl From<&RetrievalConfig> for NeighborhoodOptions {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            entity_index: config.entity_index.clone(),
            match_limit: config.fulltext_limit,
            triple_limit: config.triple_limit,
            excluded_relationships: config.excluded_relationships.clone(),
        }
    }
}

/// Graph store backed by Neo4j.
pub struct GraphStore {
    graph: Graph,
    options: NeighborhoodOptions,
}

impl GraphStore {
    /// Connect to a Neo4j server.
    pub async fn connect(uri: &str, username: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, username, password).await?;
        debug!("Connected to Neo4j at {}", uri);

        Ok(Self {
            graph,
            options: NeighborhoodOptions::default(),
        })
    }

    /// Connect using `NEO4J_URI` / `NEO4J_USERNAME` / `NEO4J_PASSWORD`.
    pub async fn from_env() -> Result<Self> {
        let uri = require_env("NEO4J_URI")?;
        let username = require_env("NEO4J_USERNAME")?;
        let password = require_env("NEO4J_PASSWORD")?;
        Self::connect(&uri, &username, &password).await
    }

    /// Override the default neighborhood options.
    pub fn with_options(mut self, options: NeighborhoodOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &NeighborhoodOptions {
        &self.options
    }

    /// Create the full-text entity index if it does not exist yet.
    pub async fn ensure_entity_index(&self) -> Result<()> {
        let index = valid_identifier(&self.options.entity_index)?;
        let cypher = format!(
            "CREATE FULLTEXT INDEX {index} IF NOT EXISTS \
             FOR (e:__Entity__) ON EACH [e.id]"
        );

        self.graph.run(query(&cypher)).await?;
        info!("Full-text entity index '{}' is in place", index);
        Ok(())
    }

    /// Total node count, for post-setup sanity logging.
    pub async fn node_count(&self) -> Result<i64> {
        let mut stream = self
            .graph
            .execute(query("MATCH (n) RETURN count(n) AS count"))
            .await?;

        match stream.next().await? {
            Some(row) => Ok(row.get::<i64>("count")?),
            None => Ok(0),
        }
    }

    /// Upsert an entity node. Nodes carry the base `__Entity__` label plus
    /// their own label, and are identified by `id`.
    pub async fn merge_entity(&self, id: &str, label: &str) -> Result<()> {
        let label = valid_identifier(label)?;
        let cypher = format!("MERGE (e:__Entity__ {{id: $id}}) SET e:`{label}`");

        self.graph.run(query(&cypher).param("id", id)).await?;
        Ok(())
    }

    /// Upsert a typed relationship between two entities.
    pub async fn merge_relationship(
        &self,
        source: &str,
        relationship: &str,
        target: &str,
    ) -> Result<()> {
        let relationship = valid_identifier(relationship)?;
        let cypher = format!(
            "MATCH (a:__Entity__ {{id: $source}}), (b:__Entity__ {{id: $target}}) \
             MERGE (a)-[:`{relationship}`]->(b)"
        );

        self.graph
            .run(query(&cypher).param("source", source).param("target", target))
            .await?;
        Ok(())
    }

    /// Upsert a source-document node holding raw passage text.
    pub async fn merge_document(&self, id: &str, source: &str, text: &str) -> Result<()> {
        self.graph
            .run(
                query("MERGE (d:Document {id: $id}) SET d.source = $source, d.text = $text")
                    .param("id", id)
                    .param("source", source)
                    .param("text", text),
            )
            .await?;
        Ok(())
    }

    /// Link a document to an entity it mentions. These provenance edges
    /// are exactly what the neighborhood query excludes.
    pub async fn link_mention(&self, document_id: &str, entity_id: &str) -> Result<()> {
        self.graph
            .run(
                query(
                    "MATCH (d:Document {id: $document_id}), (e:__Entity__ {id: $entity_id}) \
                     MERGE (d)-[:MENTIONS]->(e)",
                )
                .param("document_id", document_id)
                .param("entity_id", entity_id),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EntityNeighbors for GraphStore {
    /// One fuzzy lookup + one-hop expansion, returning formatted triples.
    /// Zero matches or zero qualifying neighbors yield an empty vec.
    async fn neighborhood(&self, term: &str) -> Result<Vec<String>> {
        let mut stream = self
            .graph
            .execute(
                query(NEIGHBORHOOD_QUERY)
                    .param("index", self.options.entity_index.as_str())
                    .param("term", term)
                    .param("match_limit", self.options.match_limit)
                    .param("excluded", self.options.excluded_relationships.clone())
                    .param("triple_limit", self.options.triple_limit),
            )
            .await?;

        let mut triples = Vec::new();
        while let Some(row) = stream.next().await? {
            triples.push(row.get::<String>("output")?);
        }

        debug!("Neighborhood for '{}': {} triples", term, triples.len());
        Ok(triples)
    }
}

fn require_env(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| Error::InvalidArgument(format!("{var} not set")))
}

/// Identifiers interpolated into Cypher (index names, labels, relationship
/// types) must be plain word characters; everything else is rejected.
fn valid_identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(name)
    } else {
        Err(Error::InvalidArgument(format!(
            "invalid graph identifier: '{name}'"
        )))
    }
}
