//! Line and column position utilities
//!
//! Converts byte offsets into the 1-based line/column pairs used by error
//! messages. Lines are split on `\n` only; columns count `char`s from the
//! start of the line.

/// A 1-based line and column position in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    /// One-based line number
    pub line: usize,
    /// One-based column number (in chars)
    pub column: usize,
}

impl LineCol {
    /// Create a new line/column position
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Compute the position of `offset` by scanning `text` once.
    ///
    /// Offsets past the end of the text are clamped to the end.
    #[must_use]
    pub fn of(text: &str, offset: usize) -> Self {
        LineIndex::new(text).line_col(text, offset)
    }
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line index for converting byte offsets to line/column positions
///
/// Caches line start offsets so repeated lookups are a binary search
/// instead of a rescan of the text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets of line starts (including the start of the first line at 0)
    line_starts: Vec<usize>,
    text_len: usize,
}

impl LineIndex {
    /// Create a new line index from source text
    ///
    /// # Example
    ///
    /// ```rust
    /// use pegloom::line_col::LineIndex;
    ///
    /// let text = "line 1\nline 2\nline 3";
    /// let index = LineIndex::new(text);
    /// let pos = index.line_col(text, 10);
    /// assert_eq!(pos.line, 2);
    /// assert_eq!(pos.column, 4);
    /// ```
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            line_starts,
            text_len: text.len(),
        }
    }

    /// Convert a byte offset to a line/column position
    ///
    /// `text` must be the same text the index was built from.
    #[must_use]
    pub fn line_col(&self, text: &str, offset: usize) -> LineCol {
        let mut offset = offset.min(self.text_len);
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };

        let line_start = self.line_starts[line];
        let column = text[line_start..offset].chars().count();

        LineCol::new(line + 1, column + 1)
    }

    /// Get the total number of lines in the text
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the byte range of a 1-based line, without its trailing newline
    #[must_use]
    pub fn line_range(&self, line: usize) -> Option<std::ops::Range<usize>> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map_or(self.text_len, |next| next - 1);
        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(LineCol::of("abc", 0), LineCol::new(1, 1));
        assert_eq!(LineCol::of("abc", 2), LineCol::new(1, 3));
    }

    #[test]
    fn test_after_newline() {
        let text = "ab\ncd\n";
        assert_eq!(LineCol::of(text, 3), LineCol::new(2, 1));
        assert_eq!(LineCol::of(text, 5), LineCol::new(2, 3));
        assert_eq!(LineCol::of(text, 6), LineCol::new(3, 1));
    }

    #[test]
    fn test_end_of_input_clamped() {
        assert_eq!(LineCol::of("ab", 99), LineCol::new(1, 3));
    }

    #[test]
    fn test_columns_count_chars() {
        let text = "é=x";
        // 'é' is two bytes, '=' starts at byte 2
        assert_eq!(LineCol::of(text, 2), LineCol::new(1, 2));
    }

    #[test]
    fn test_line_range() {
        let text = "one\ntwo\nthree";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_range(2), Some(4..7));
        assert_eq!(index.line_range(3), Some(8..13));
        assert_eq!(index.line_range(4), None);
        assert_eq!(index.line_range(0), None);
    }
}
