// WHY: title abbreviations ("Dr. Smith") would otherwise end a sentence before every proper noun

use std::collections::HashSet;

/// Titles that precede a capitalized name and never end a sentence
pub const TITLE_ABBREVIATIONS: &[&str] = &["Dr.", "Mr.", "Mrs.", "Ms.", "Prof.", "Sr.", "Jr."];

/// Lookup of abbreviations that suppress a `.` boundary
pub struct AbbreviationChecker {
    title_abbreviations: HashSet<&'static str>,
}

impl AbbreviationChecker {
    pub fn new() -> Self {
        Self {
            title_abbreviations: TITLE_ABBREVIATIONS.iter().copied().collect(),
        }
    }

    /// Check if a word is a title abbreviation
    pub fn is_title_abbreviation(&self, word: &str) -> bool {
        self.title_abbreviations.contains(word)
    }

    /// Check if text (ending with the candidate terminator) ends with a title abbreviation.
    /// Opening quotes and brackets glued to the word are ignored.
    pub fn ends_with_title_abbreviation(&self, text: &str) -> bool {
        match text.split_whitespace().last() {
            Some(last_word) => {
                let clean_word = last_word.trim_start_matches(|c: char| {
                    matches!(c, '"' | '\'' | '(' | '[' | '\u{201C}' | '\u{2018}')
                });
                self.is_title_abbreviation(clean_word)
            }
            None => false,
        }
    }
}

impl Default for AbbreviationChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_detection() {
        let checker = AbbreviationChecker::new();
        for abbr in ["Dr.", "Prof.", "Mr.", "Mrs."] {
            assert!(checker.is_title_abbreviation(abbr), "Should detect {abbr} as title");
        }
        assert!(!checker.is_title_abbreviation("U.S.A."));
        assert!(!checker.is_title_abbreviation("dr."));
    }

    #[test]
    fn test_street_abbreviation_can_end_a_sentence() {
        let checker = AbbreviationChecker::new();
        assert_eq!(TITLE_ABBREVIATIONS.len(), 7);
        assert!(!checker.ends_with_title_abbreviation("She lives on Main St."));
        assert!(checker.ends_with_title_abbreviation("Ask Jr."));
    }

    #[test]
    fn test_text_ending_detection() {
        let checker = AbbreviationChecker::new();
        let cases = [
            ("Call Dr.", true),
            ("She met (Prof.", true),
            ("\u{201C}Mr.", true),
            ("This is a sentence.", false),
            ("Meeting at 5 p.m.", false),
            ("", false),
        ];
        for (text, expected) in cases {
            assert_eq!(checker.ends_with_title_abbreviation(text), expected, "text: {text:?}");
        }
    }
}
