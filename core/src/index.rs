use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type DocId = u32;

/// One entry of a postings line, stored on disk as `{"id": .., "frequency": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub id: DocId,
    pub frequency: u32,
}

/// Where a term's postings line starts. Serialized as `[offset, shard]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, u32)", into = "(u64, u32)")]
pub struct TermLocation {
    pub offset: u64,
    pub shard: u32,
}

impl From<(u64, u32)> for TermLocation {
    fn from((offset, shard): (u64, u32)) -> Self {
        Self { offset, shard }
    }
}

impl From<TermLocation> for (u64, u32) {
    fn from(loc: TermLocation) -> Self {
        (loc.offset, loc.shard)
    }
}

/// Term directory: stemmed term to postings location.
pub type Directory = HashMap<String, TermLocation>;

/// Contents of `meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Shard file name prefix; shard `i` lives in `{filename}{i}.csv`.
    pub filename: String,
    pub breakpoints: Vec<String>,
    #[serde(rename = "documentCount")]
    pub document_count: u64,
}

impl IndexMeta {
    pub fn shard_count(&self) -> usize {
        self.breakpoints.len() + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocRecord {
    pub url: String,
    /// Precomputed vector norm of the document.
    pub length_normalizer: f64,
}

/// A fully materialized index, as handed over by the offline indexer before
/// it is laid out on disk by [`crate::persist::write_index`].
#[derive(Debug, Default)]
pub struct InvertedIndex {
    pub postings: BTreeMap<String, Vec<Posting>>,
    pub documents: BTreeMap<DocId, DocRecord>,
    pub document_count: u64,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn add_document(&mut self, id: DocId, url: impl Into<String>, length_normalizer: f64) {
        let previous = self.documents.insert(id, DocRecord { url: url.into(), length_normalizer });
        if previous.is_none() {
            self.document_count += 1;
        }
    }

    pub fn add_posting(&mut self, term: impl Into<String>, id: DocId, frequency: u32) {
        self.postings.entry(term.into()).or_default().push(Posting { id, frequency });
    }
}
