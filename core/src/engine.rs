use crate::cache::TermCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::{DocId, DocRecord, Directory, IndexMeta, Posting};
use crate::persist::{load_index_header, load_stopwords, IndexPaths};
use crate::shard::ShardStore;
use crate::tokenizer::stem_all;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sublinear tf-idf weight of a query term: `(1 + log10 tf) * log10(N / df)`.
pub fn query_term_weight(count_in_query: u32, document_frequency: u32, document_count: u64) -> f64 {
    (1.0 + f64::from(count_in_query).log10()) * (document_count as f64 / f64::from(document_frequency)).log10()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub doc_id: DocId,
    pub url: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Documents that matched before truncation to `k_results`.
    pub total_hits: usize,
    pub hits: Vec<Hit>,
}

struct Ranking {
    ranked: Vec<(DocId, f64)>,
    stopwords_removed: bool,
}

/// Query engine over one on-disk index. Shareable across threads.
pub struct Engine {
    location: PathBuf,
    config: Config,
    meta: IndexMeta,
    directory: Directory,
    shards: ShardStore,
    documents: HashMap<DocId, DocRecord>,
    stopwords: HashSet<String>,
    cache: Mutex<TermCache>,
}

impl Engine {
    /// Open the index at `index_dir`, reading stopwords from its `stop_words.txt`.
    pub fn open(index_dir: impl AsRef<Path>, config: Config) -> Result<Self> {
        let stopwords = IndexPaths::new(index_dir.as_ref()).stopwords();
        Self::open_with_stopwords(index_dir, stopwords, config)
    }

    pub fn open_with_stopwords(index_dir: impl AsRef<Path>, stopwords: impl AsRef<Path>, config: Config) -> Result<Self> {
        let paths = IndexPaths::new(index_dir);
        let (meta, directory, documents) = load_index_header(&paths)?;
        let stopwords = load_stopwords(stopwords.as_ref())?;
        let shards = ShardStore::open(&paths, &meta.filename, meta.shard_count())?;

        info!(
            index = %paths.root.display(),
            terms = directory.len(),
            documents = documents.len(),
            shards = shards.len(),
            stopwords = stopwords.len(),
            "index opened"
        );
        Ok(Self {
            location: paths.root,
            cache: Mutex::new(TermCache::new(config.cache_size)),
            config,
            meta,
            directory,
            shards,
            documents,
            stopwords,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn document_count(&self) -> u64 {
        self.meta.document_count
    }

    /// URLs of the top `k_results` documents for `query`.
    pub fn search(&self, query: &str, include_stopwords: bool) -> Result<Vec<String>> {
        Ok(self.search_scored(query, include_stopwords)?.hits.into_iter().map(|h| h.url).collect())
    }

    /// Rank `query`; if stopword removal left fewer than `k_results` matches,
    /// rank once more with stopwords kept.
    pub fn search_scored(&self, query: &str, include_stopwords: bool) -> Result<SearchOutcome> {
        let k = self.config.k_results;
        let first = self.rank(query, include_stopwords)?;
        let ranked = if !include_stopwords && first.stopwords_removed && first.ranked.len() < k {
            warn!(query, matches = first.ranked.len(), k, "too few matches, retrying with stopwords");
            self.rank(query, true)?.ranked
        } else {
            first.ranked
        };

        let total_hits = ranked.len();
        let hits = ranked
            .into_iter()
            .take(k)
            .map(|(doc_id, score)| {
                let url = self.document(doc_id)?.url.clone();
                Ok(Hit { doc_id, url, score })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SearchOutcome { total_hits, hits })
    }

    fn document(&self, doc_id: DocId) -> Result<&DocRecord> {
        self.documents
            .get(&doc_id)
            .ok_or_else(|| Error::corrupt(&self.location, format!("document {doc_id} is not in the document table")))
    }

    /// Postings for `term` from the cache or the shard store; `None` if the
    /// term was never indexed.
    fn postings(&self, term: &str) -> Result<Option<(u32, Arc<[Posting]>)>> {
        if let Some(hit) = self.cache.lock().lookup(term) {
            debug!(term, "cache hit");
            return Ok(Some(hit));
        }
        let Some(&loc) = self.directory.get(term) else {
            debug!(term, "term not indexed");
            return Ok(None);
        };
        let (df, postings) = self.shards.read_postings_at(term, loc, self.config.field_cap())?;
        debug!(term, df, read = postings.len(), shard = loc.shard, "postings read");
        let postings: Arc<[Posting]> = postings.into();
        self.cache.lock().insert(term, df, Arc::clone(&postings));
        Ok(Some((df, postings)))
    }

    fn rank(&self, query: &str, include_stopwords: bool) -> Result<Ranking> {
        let mut terms = stem_all(query);
        let mut stopwords_removed = false;
        if !include_stopwords {
            let before = terms.len();
            terms.retain(|t| !self.stopwords.contains(t));
            stopwords_removed = terms.len() < before;
        }

        // distinct terms in order of first appearance, with multiplicity
        let mut counts: Vec<(String, u32)> = Vec::new();
        for term in terms {
            match counts.iter_mut().find(|(t, _)| *t == term) {
                Some((_, n)) => *n += 1,
                None => counts.push((term, 1)),
            }
        }

        let mut weighted: Vec<(f64, Arc<[Posting]>)> = Vec::with_capacity(counts.len());
        for (term, count) in &counts {
            if let Some((df, postings)) = self.postings(term)? {
                weighted.push((query_term_weight(*count, df, self.meta.document_count), postings));
            }
        }

        let norm = weighted.iter().map(|(w, _)| w * w).sum::<f64>().sqrt();
        if !(norm.is_finite() && norm > 0.0) {
            return Ok(Ranking { ranked: Vec::new(), stopwords_removed });
        }

        let mut slots: HashMap<DocId, usize> = HashMap::new();
        let mut ranked: Vec<(DocId, f64)> = Vec::new();
        for (w, postings) in &weighted {
            let wtq = w / norm;
            for p in postings.iter() {
                let slot = *slots.entry(p.id).or_insert_with(|| {
                    ranked.push((p.id, 0.0));
                    ranked.len() - 1
                });
                ranked[slot].1 += wtq * f64::from(p.frequency);
            }
        }

        for (doc_id, score) in ranked.iter_mut() {
            *score /= self.document(*doc_id)?.length_normalizer;
        }
        // stable: ties keep discovery order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(Ranking { ranked, stopwords_removed })
    }
}
