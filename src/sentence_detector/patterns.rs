// WHY: each boundary rule is its own compiled sub-pattern so it can be exercised alone
// Composition happens in code (terminator, then optional footnote, then a next-sentence cue)

use anyhow::Result;
use regex_automata::{meta::Regex, Anchored, Input};
use tracing::debug;

/// Footnote marker directly after a terminator: `[12]`, `(a)`
pub const FOOTNOTE_PATTERN: &str = r"\[[0-9a-zA-Z]+\]|\([0-9a-zA-Z]+\)";

/// Han, Hiragana, Katakana and Hangul syllables
pub const CJK_CHAR_PATTERN: &str =
    r"[\u{4E00}-\u{9FFF}\u{3040}-\u{309F}\u{30A0}-\u{30FF}\u{AC00}-\u{D7AF}]";

const UPPERCASE_AFTER_SPACE_PATTERN: &str = r"\s+[A-Z]";
const OPENING_PAREN_PATTERN: &str = r"\s*\(";
const LIST_ITEM_CLOSE_PATTERN: &str = r"(?i)</li>";
const CLOSING_PUNCTUATION_PATTERN: &str = r"[\)\]\}\u{201D}\u{2019}]+";

/// Which lookahead accepted a boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextSentenceCue {
    UppercaseAfterSpace,
    CjkStart,
    OpeningParen,
    EndOfText,
    ListItemClose,
    /// `)` `]` `}` or a closing smart quote; the run of closers stays with the sentence
    ClosingPunctuation,
}

/// Byte span of an accepted boundary match in the searched text.
/// `start` is the terminator, `end` is past the terminator, any footnote and any closers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryMatch {
    pub start: usize,
    pub end: usize,
    pub cue: NextSentenceCue,
}

pub struct BoundaryPatterns {
    terminator: Regex,
    footnote: Regex,
    uppercase_after_space: Regex,
    cjk_start: Regex,
    opening_paren: Regex,
    list_item_close: Regex,
    closing_punctuation: Regex,
}

impl BoundaryPatterns {
    /// Compile the sub-patterns for the given terminator set
    pub fn new(end_punctuation: &[char]) -> Result<Self> {
        if end_punctuation.is_empty() {
            anyhow::bail!("Terminator set must not be empty");
        }
        let terminator_pattern = terminator_class(end_punctuation);
        debug!("Compiling boundary sub-patterns, terminator class {}", terminator_pattern);

        Ok(Self {
            terminator: Regex::new(&terminator_pattern)?,
            footnote: Regex::new(FOOTNOTE_PATTERN)?,
            uppercase_after_space: Regex::new(UPPERCASE_AFTER_SPACE_PATTERN)?,
            cjk_start: Regex::new(CJK_CHAR_PATTERN)?,
            opening_paren: Regex::new(OPENING_PAREN_PATTERN)?,
            list_item_close: Regex::new(LIST_ITEM_CLOSE_PATTERN)?,
            closing_punctuation: Regex::new(CLOSING_PUNCTUATION_PATTERN)?,
        })
    }

    /// Byte spans of every terminator char in `text`
    pub fn terminators<'h>(&'h self, text: &'h str) -> impl Iterator<Item = (usize, usize)> + 'h {
        self.terminator.find_iter(text).map(|m| (m.start(), m.end()))
    }

    /// End of a footnote marker starting exactly at `pos`
    pub fn footnote_at(&self, text: &str, pos: usize) -> Option<usize> {
        anchored_match_end(&self.footnote, text, pos)
    }

    /// First lookahead that holds at `pos`, without consuming anything
    pub fn next_sentence_cue(&self, text: &str, pos: usize) -> Option<NextSentenceCue> {
        if pos >= text.len() {
            return Some(NextSentenceCue::EndOfText);
        }
        if anchored_match_end(&self.uppercase_after_space, text, pos).is_some() {
            return Some(NextSentenceCue::UppercaseAfterSpace);
        }
        if anchored_match_end(&self.cjk_start, text, pos).is_some() {
            return Some(NextSentenceCue::CjkStart);
        }
        if anchored_match_end(&self.opening_paren, text, pos).is_some() {
            return Some(NextSentenceCue::OpeningParen);
        }
        if anchored_match_end(&self.list_item_close, text, pos).is_some() {
            return Some(NextSentenceCue::ListItemClose);
        }
        if anchored_match_end(&self.closing_punctuation, text, pos).is_some() {
            return Some(NextSentenceCue::ClosingPunctuation);
        }
        None
    }

    /// Try the terminator at `term_start..term_end` as a boundary.
    ///
    /// The footnote-extended match is tried first; when its end fails every
    /// lookahead the bare terminator is tried, mirroring regex backtracking.
    pub fn boundary_at(
        &self,
        text: &str,
        term_start: usize,
        term_end: usize,
        footnotes: bool,
    ) -> Option<BoundaryMatch> {
        if footnotes {
            if let Some(footnote_end) = self.footnote_at(text, term_end) {
                if let Some(boundary) = self.accept(text, term_start, footnote_end) {
                    return Some(boundary);
                }
            }
        }
        self.accept(text, term_start, term_end)
    }

    fn accept(&self, text: &str, term_start: usize, end: usize) -> Option<BoundaryMatch> {
        let cue = self.next_sentence_cue(text, end)?;
        let end = match cue {
            NextSentenceCue::ClosingPunctuation => {
                anchored_match_end(&self.closing_punctuation, text, end).unwrap_or(end)
            }
            _ => end,
        };
        Some(BoundaryMatch {
            start: term_start,
            end,
            cue,
        })
    }
}

fn anchored_match_end(regex: &Regex, text: &str, pos: usize) -> Option<usize> {
    if pos > text.len() {
        return None;
    }
    let input = Input::new(text).range(pos..).anchored(Anchored::Yes);
    regex.search(&input).map(|m| m.end())
}

fn terminator_class(end_punctuation: &[char]) -> String {
    let mut class = String::from("[");
    for &ch in end_punctuation {
        if ch.is_ascii_punctuation() {
            class.push('\\');
        }
        class.push(ch);
    }
    class.push(']');
    class
}
