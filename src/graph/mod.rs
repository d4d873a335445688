//! Entity graph access: fuzzy full-text query generation and the
//! Neo4j-backed store.

pub mod fulltext;
pub mod store;

pub use fulltext::{fulltext_query, remove_lucene_chars, FUZZY_EDIT_DISTANCE};
pub use store::{GraphStore, NeighborhoodOptions};
