// WHY: sentence boundary location for a single offset inside a block of text
// Heuristic punctuation scan, not a linguistic parser

use serde::Serialize;

pub mod abbreviations;
pub mod cache;
pub mod locator;
pub mod normalization;
pub mod patterns;

pub use abbreviations::AbbreviationChecker;
pub use cache::{SentenceCache, DEFAULT_CACHE_CAPACITY};
pub use locator::SentenceBoundaryLocator;
pub use normalization::{normalize_sentence, normalize_sentence_into, NormalizedText};
pub use patterns::{BoundaryMatch, BoundaryPatterns, NextSentenceCue};

/// Half-open `[start, end)` char interval of one sentence in raw text.
/// `start == end` means no sentence was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SentenceSpan {
    pub start: usize,
    pub end: usize,
}

impl SentenceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when there is nothing to highlight
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Raw sentence text; offsets are clamped to the text
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        if self.is_empty() {
            return "";
        }
        let start = byte_offset(text, self.start);
        let end = byte_offset(text, self.end);
        &text[start..end]
    }
}

/// Configuration for sentence boundary detection rules
#[derive(Debug, Clone)]
pub struct BoundaryRules {
    /// Characters that can terminate a sentence
    pub end_punctuation: Vec<char>,
    /// Absorb `[1]` / `(a)` markers directly after a terminator
    pub footnotes: bool,
    /// Suppress `.` boundaries after title abbreviations such as `Dr.`
    pub title_abbreviations: bool,
}

impl Default for BoundaryRules {
    fn default() -> Self {
        Self {
            end_punctuation: vec!['.', '!', '?', '\u{3002}', '\u{FF01}', '\u{FF1F}', '\u{FE15}', '\u{FE16}'],
            footnotes: true,
            title_abbreviations: true,
        }
    }
}

/// Byte position of the `char_offset`-th char, clamped to `text.len()`
pub fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}
