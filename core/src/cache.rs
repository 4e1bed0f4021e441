use crate::index::Posting;
use std::sync::Arc;

pub const DEFAULT_CACHE_SIZE: usize = 25;

#[derive(Debug)]
struct CacheEntry {
    term: String,
    document_frequency: u32,
    postings: Arc<[Posting]>,
}

/// Fixed-size ring of recently read postings lists.
///
/// Holds at most `capacity` entries. Once full, each insert overwrites the
/// slot under a cursor that advances by one (mod `capacity`), whether or not
/// that slot was recently looked up: eviction is first-in first-out by slot.
#[derive(Debug)]
pub struct TermCache {
    capacity: usize,
    entries: Vec<CacheEntry>,
    cursor: usize,
}

impl TermCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: Vec::with_capacity(capacity), cursor: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, term: &str) -> Option<(u32, Arc<[Posting]>)> {
        self.entries
            .iter()
            .find(|e| e.term == term)
            .map(|e| (e.document_frequency, Arc::clone(&e.postings)))
    }

    pub fn insert(&mut self, term: &str, document_frequency: u32, postings: Arc<[Posting]>) {
        if self.capacity == 0 {
            return;
        }
        let entry = CacheEntry { term: term.to_string(), document_frequency, postings };
        // a live term is refreshed in place; keys stay unique
        if let Some(slot) = self.entries.iter_mut().find(|e| e.term == term) {
            *slot = entry;
        } else if self.entries.len() < self.capacity {
            self.entries.push(entry);
        } else {
            self.entries[self.cursor] = entry;
            self.cursor = (self.cursor + 1) % self.capacity;
        }
    }
}

impl Default for TermCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}
