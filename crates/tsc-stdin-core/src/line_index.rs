//! Line-start index measured in UTF-16 code units.
//!
//! The type-checking engine reports positions as offsets into a UTF-16 view of the file text.
//! This index maps such an offset back to a `(line, character)` pair using the engine's own
//! line-break rules: LF, CR, CRLF, U+2028 (line separator) and U+2029 (paragraph separator).

/// A zero-based line/character pair (`character` counts UTF-16 code units).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAndCharacter {
    /// Line number (0-based).
    pub line: usize,
    /// Offset within the line in UTF-16 code units (0-based).
    pub character: usize,
}

impl LineAndCharacter {
    /// Create a new line/character pair.
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Immutable line-start table for one text snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// UTF-16 offset at which each line starts. Always starts with `0`.
    line_starts: Vec<usize>,
    /// Total text length in UTF-16 code units.
    utf16_len: usize,
}

impl LineIndex {
    /// Build the index for `text`.
    pub fn from_text(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut pos = 0usize;
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            pos += ch.len_utf16();
            match ch {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                        pos += 1;
                    }
                    line_starts.push(pos);
                }
                '\n' | '\u{2028}' | '\u{2029}' => line_starts.push(pos),
                _ => {}
            }
        }

        Self {
            line_starts,
            utf16_len: pos,
        }
    }

    /// Number of lines (an empty text has one line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Total text length in UTF-16 code units.
    pub fn utf16_len(&self) -> usize {
        self.utf16_len
    }

    /// UTF-16 offset of the first code unit of `line`, if the line exists.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Map a UTF-16 offset to a zero-based line/character pair.
    ///
    /// Offsets past the end of the text are clamped to the end.
    pub fn line_and_character_of_position(&self, position: usize) -> LineAndCharacter {
        let position = position.min(self.utf16_len);
        let line = match self.line_starts.binary_search(&position) {
            Ok(line) => line,
            // `line_starts[0] == 0`, so `idx >= 1` whenever the search misses.
            Err(idx) => idx - 1,
        };
        LineAndCharacter::new(line, position - self.line_starts[line])
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::from_text("")
    }
}
