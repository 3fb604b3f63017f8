// WHY: maps one offset in a block of text to the sentence around it
// Search runs on whitespace-collapsed text; the span is mapped back to raw coordinates before returning

use anyhow::Result;
use tracing::{debug, trace};

use super::{
    AbbreviationChecker, BoundaryMatch, BoundaryPatterns, BoundaryRules, NormalizedText,
    SentenceCache, SentenceSpan, DEFAULT_CACHE_CAPACITY,
};

/// Sentence Boundary Locator with an owned memo cache
pub struct SentenceBoundaryLocator {
    rules: BoundaryRules,
    patterns: BoundaryPatterns,
    abbreviations: AbbreviationChecker,
    cache: SentenceCache,
}

impl SentenceBoundaryLocator {
    /// Create locator with custom rules
    pub fn new(rules: BoundaryRules) -> Result<Self> {
        Self::with_cache_capacity(rules, DEFAULT_CACHE_CAPACITY)
    }

    /// Create locator with default rules
    pub fn with_default_rules() -> Result<Self> {
        Self::new(BoundaryRules::default())
    }

    pub fn with_cache_capacity(rules: BoundaryRules, capacity: usize) -> Result<Self> {
        let patterns = BoundaryPatterns::new(&rules.end_punctuation)?;
        Ok(Self {
            rules,
            patterns,
            abbreviations: AbbreviationChecker::new(),
            cache: SentenceCache::new(capacity),
        })
    }

    pub fn rules(&self) -> &BoundaryRules {
        &self.rules
    }

    /// Span of the sentence containing `offset` (chars into `text`), memoized.
    pub fn find_sentence_boundaries(&mut self, text: &str, offset: usize) -> SentenceSpan {
        if let Some(span) = self.cache.get(text, offset) {
            trace!(offset, "sentence cache hit");
            return span;
        }

        let span = self.locate(text, offset);
        self.cache.insert(text, offset, span);
        span
    }

    /// Uncached boundary computation; a pure function of `(text, offset)`
    pub fn locate(&self, text: &str, offset: usize) -> SentenceSpan {
        let normalized = NormalizedText::new(text);
        let collapsed = normalized.as_str();
        let target = normalized.to_normalized(offset);
        let target_byte = normalized.byte_at(target);

        let boundaries = self.boundaries(collapsed);

        let mut start_byte = 0;
        for boundary in &boundaries {
            if boundary.end > target_byte {
                break;
            }
            start_byte = boundary.end;
            while collapsed.as_bytes().get(start_byte) == Some(&b' ') {
                start_byte += 1;
            }
        }

        // Same ownership rule as the start scan: a boundary closes the sentence the offset sits in until its end
        let end_byte = boundaries
            .iter()
            .find(|boundary| boundary.end > target_byte)
            .map(|boundary| boundary.end)
            .unwrap_or(collapsed.len());

        let span = SentenceSpan::new(
            normalized.to_raw(normalized.char_at_byte(start_byte)),
            normalized.to_raw(normalized.char_at_byte(end_byte)),
        );
        debug!(
            offset,
            normalized_offset = target,
            start = span.start,
            end = span.end,
            "located sentence"
        );
        span
    }

    /// Every accepted boundary in `text`, in order, as byte spans
    pub fn boundaries(&self, text: &str) -> Vec<BoundaryMatch> {
        let mut boundaries = Vec::new();
        for (term_start, term_end) in self.patterns.terminators(text) {
            if self.rules.title_abbreviations
                && &text[term_start..term_end] == "."
                && self.abbreviations.ends_with_title_abbreviation(&text[..term_end])
            {
                continue;
            }
            if let Some(boundary) =
                self.patterns.boundary_at(text, term_start, term_end, self.rules.footnotes)
            {
                boundaries.push(boundary);
            }
        }
        boundaries
    }

    /// Drop every memoized span
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
