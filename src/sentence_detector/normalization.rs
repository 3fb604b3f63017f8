// WHY: whitespace collapsing with an invertible offset map
// Boundary search runs on collapsed text; callers speak raw offsets, so every offset crosses this map

/// Raw text with every maximal whitespace run collapsed to one space.
///
/// Offsets are counted in `char`s on both sides. The map is built in a single
/// pass and answers raw → normalized and normalized → raw in O(1).
#[derive(Debug, Clone)]
pub struct NormalizedText {
    text: String,
    /// Raw char index of the first raw char behind each normalized char
    raw_index: Vec<usize>,
    /// Byte offset of each normalized char, plus a trailing `text.len()`
    byte_index: Vec<usize>,
    /// Normalized chars produced by `raw[..i]`, for every `i` in `0..=raw_len`
    produced_before: Vec<usize>,
}

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut raw_index = Vec::with_capacity(raw.len());
        let mut byte_index = Vec::with_capacity(raw.len() + 1);
        let mut produced_before = Vec::with_capacity(raw.len() + 1);
        let mut prev_was_space = false;

        for (raw_pos, ch) in raw.chars().enumerate() {
            produced_before.push(raw_index.len());
            if ch.is_whitespace() {
                if prev_was_space {
                    continue;
                }
                byte_index.push(text.len());
                raw_index.push(raw_pos);
                text.push(' ');
                prev_was_space = true;
            } else {
                byte_index.push(text.len());
                raw_index.push(raw_pos);
                text.push(ch);
                prev_was_space = false;
            }
        }
        produced_before.push(raw_index.len());
        byte_index.push(text.len());

        Self {
            text,
            raw_index,
            byte_index,
            produced_before,
        }
    }

    /// Collapsed text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the collapsed text in chars
    pub fn char_len(&self) -> usize {
        self.raw_index.len()
    }

    /// Length of the raw text in chars
    pub fn raw_len(&self) -> usize {
        self.produced_before.len() - 1
    }

    /// Translate a raw offset into the collapsed text.
    ///
    /// Equals `raw_offset - (len(raw[..raw_offset]) - len(collapse(raw[..raw_offset])))`.
    /// Offsets past the end clamp to the end.
    pub fn to_normalized(&self, raw_offset: usize) -> usize {
        let clamped = raw_offset.min(self.raw_len());
        self.produced_before[clamped]
    }

    /// Translate a collapsed offset back to the raw text.
    ///
    /// A collapsed space maps to the first char of the whitespace run it replaced;
    /// the end of the collapsed text maps to the end of the raw text.
    pub fn to_raw(&self, normalized_offset: usize) -> usize {
        self.raw_index
            .get(normalized_offset)
            .copied()
            .unwrap_or_else(|| self.raw_len())
    }

    /// Byte position in the collapsed text of a collapsed char offset
    pub fn byte_at(&self, normalized_offset: usize) -> usize {
        let clamped = normalized_offset.min(self.char_len());
        self.byte_index[clamped]
    }

    /// Collapsed char offset of a byte position that lies on a char boundary
    pub fn char_at_byte(&self, byte_pos: usize) -> usize {
        match self.byte_index.binary_search(&byte_pos) {
            Ok(idx) => idx,
            Err(idx) => idx.min(self.char_len()),
        }
    }
}

/// Normalize sentence by removing interior hard line breaks and collapsing whitespace
/// Used for display of an extracted sentence; leading and trailing whitespace is trimmed
pub fn normalize_sentence(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    normalize_sentence_into(text, &mut result);
    result
}

/// Normalize sentence into supplied buffer to avoid allocation
pub fn normalize_sentence_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut prev_was_space = true; // swallows leading whitespace
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                buffer.push(' ');
                prev_was_space = true;
            }
        } else {
            buffer.push(ch);
            prev_was_space = false;
        }
    }

    if buffer.ends_with(' ') {
        buffer.pop();
    }
}
