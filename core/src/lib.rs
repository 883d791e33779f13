//! In-memory TF-IDF full-text search: an inverted index over short space-separated
//! documents, plus/minus term queries and ranked top-K retrieval, scored either
//! sequentially or across the rayon pool through a sharded accumulator.

pub mod accumulator;
pub mod batch;
pub mod config;
pub mod dedup;
pub mod error;
pub mod flatten;
pub mod index;
pub mod query;
pub mod ranker;
pub mod requests;
pub mod server;
pub mod terms;
pub mod tokenizer;

pub use config::{EngineConfig, ExecutionPolicy};
pub use error::{InvalidDocumentReason, Result, SearchError};
pub use index::{DocId, DocMeta, DocumentStatus, TermId, WordFrequencies};
pub use ranker::{DocumentFilter, SearchHit};
pub use server::SearchServer;
