//! Query-time engine for a sharded on-disk inverted index, plus the SimHash
//! codec used to suppress near-duplicate documents at indexing time.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod persist;
pub mod shard;
pub mod simhash;
pub mod tokenizer;

pub use config::Config;
pub use engine::{Engine, Hit, SearchOutcome};
pub use error::{Error, Result};
pub use index::{DocId, DocRecord, IndexMeta, InvertedIndex, Posting, TermLocation};
