//! Incremental catalog search: append-only document store with
//! deduplication, a barrel-partitioned inverted index, weighted
//! multi-signal ranking, prefix suggestions and browse categories.

pub mod catalog;
pub mod category;
pub mod concept;
pub mod document;
pub mod index;
pub mod ingest;
pub mod persist;
pub mod rank;
pub mod record;
pub mod semantic;
pub mod store;
pub mod suggest;
pub mod tokenizer;

pub use catalog::{CatalogIndex, IngestOutcome};
pub use category::{classify, Category, CAROUSEL_SIZE, CATEGORIES};
pub use document::{DocId, Document};
pub use index::{barrel_for, InvertedIndex, Lexicon, CATCH_ALL_BARREL};
pub use ingest::{BatchSummary, ChunkedIngest, DEFAULT_CHUNK_SIZE};
pub use persist::{IndexPaths, MetaFile, SNAPSHOT_VERSION};
pub use rank::{SearchPage, DEFAULT_PAGE_SIZE};
pub use record::{RawRecord, Scalar};
pub use semantic::{MapVectors, WordVectors};
pub use store::DocumentStore;
pub use suggest::DEFAULT_SUGGESTION_LIMIT;
pub use tokenizer::tokenize;
