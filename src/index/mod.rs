//! Document indexing and similarity retrieval.
//!
//! Schema documents are chunked, embedded, and held in memory. Queries
//! return the nearest chunks by cosine similarity.

mod indexer;
mod store;

pub use indexer::DocumentIndexer;
pub use store::{SchemaIndex, ScoredChunk};

/// Default number of chunks returned per lookup.
pub const DEFAULT_TOP_K: usize = 4;

/// Default glob for schema documents.
pub const DEFAULT_DOCS_GLOB: &str = "docs/*.txt";
