//! Offset tables for one classification pass
//!
//! Engines work in absolute character offsets. Regex matches come back as
//! byte offsets and tokens come back as (line, column) pairs, so each pass
//! builds one `TextIndex` and converts through it.

/// Precomputed line starts and byte/char mapping for a buffer snapshot
#[derive(Debug, Clone)]
pub struct TextIndex {
    /// Character offset of the first character of each line
    line_starts: Vec<usize>,
    /// Byte offset of every character plus the end; None when the text is ASCII
    char_bytes: Option<Vec<usize>>,
    /// Total characters
    char_len: usize,
}

impl TextIndex {
    /// Build the index for `text`
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut char_len = 0;
        for ch in text.chars() {
            char_len += 1;
            if ch == '\n' {
                line_starts.push(char_len);
            }
        }

        let char_bytes = if text.is_ascii() {
            None
        } else {
            let mut bytes: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
            bytes.push(text.len());
            Some(bytes)
        };

        Self {
            line_starts,
            char_bytes,
            char_len,
        }
    }

    /// Total number of characters in the buffer
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Number of lines (a trailing newline opens an empty last line)
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset (on a char boundary) into a character offset
    pub fn char_offset(&self, byte: usize) -> usize {
        match &self.char_bytes {
            None => byte.min(self.char_len),
            Some(bytes) => match bytes.binary_search(&byte) {
                Ok(i) => i,
                Err(i) => i.min(self.char_len),
            },
        }
    }

    /// Convert a character offset into a byte offset
    pub fn byte_offset(&self, offset: usize) -> usize {
        let offset = offset.min(self.char_len);
        match &self.char_bytes {
            None => offset,
            Some(bytes) => bytes[offset],
        }
    }

    /// Absolute character offset of a 1-based line and 0-based column
    ///
    /// Lines past the end map to the end of the buffer.
    pub fn offset(&self, line: usize, column: usize) -> usize {
        match line.checked_sub(1).and_then(|l| self.line_starts.get(l)) {
            Some(start) => (start + column).min(self.char_len),
            None => self.char_len,
        }
    }

    /// 1-based line and 0-based column of a character offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.char_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.line_starts[line])
    }

    /// Character range of a 1-based line, including its newline
    pub fn line_range(&self, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self.line_starts.get(line).copied().unwrap_or(self.char_len);
        Some((start, end))
    }
}
