// WHY: memo of a pure function; the key embeds the full text so entries can never go stale

use std::collections::HashMap;

use super::SentenceSpan;

/// Entries kept before the whole cache is dropped
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Bounded `(text, offset) -> span` memo with clear-all eviction
#[derive(Debug)]
pub struct SentenceCache {
    entries: HashMap<String, HashMap<usize, SentenceSpan>>,
    len: usize,
    capacity: usize,
}

impl SentenceCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            len: 0,
            capacity,
        }
    }

    pub fn get(&self, text: &str, offset: usize) -> Option<SentenceSpan> {
        self.entries.get(text)?.get(&offset).copied()
    }

    /// Store a span; once the entry count exceeds capacity everything is cleared
    pub fn insert(&mut self, text: &str, offset: usize, span: SentenceSpan) {
        let added = match self.entries.get_mut(text) {
            Some(per_text) => per_text.insert(offset, span).is_none(),
            None => {
                self.entries.insert(text.to_owned(), HashMap::from([(offset, span)]));
                true
            }
        };
        if added {
            self.len += 1;
        }

        if self.len > self.capacity {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SentenceCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
