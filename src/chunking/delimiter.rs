//! Delimiter-based chunking strategy.
//!
//! Schema documents are written as sections separated by `###`. Each
//! non-empty section becomes one chunk. Sections longer than the size limit
//! are windowed with overlap, cutting on paragraph, line, sentence, or word
//! boundaries where possible.

use crate::chunking::traits::Chunker;
use crate::chunking::{DEFAULT_DELIMITER, DEFAULT_OVERLAP, DEFAULT_SECTION_SIZE};
use crate::core::Chunk;
use crate::error::{ChunkingError, Result};
use crate::io::{byte_offset_for_chars, find_char_boundary};

/// Splits documents on a literal delimiter.
///
/// # Examples
///
/// ```
/// use sqlrag_rs::chunking::{Chunker, DelimiterChunker};
///
/// let chunker = DelimiterChunker::new();
/// let text = "### customers\nid uuid\n### accounts\nbalance numeric";
/// let chunks = chunker.chunk("docs/schema.txt", text).unwrap();
/// assert_eq!(chunks.len(), 2);
/// assert!(chunks.iter().all(|c| c.source == "docs/schema.txt"));
/// ```
#[derive(Debug, Clone)]
pub struct DelimiterChunker {
    delimiter: String,
    /// Maximum section size in characters before windowing kicks in.
    max_section_size: usize,
    /// Overlap between windows of one long section, in characters.
    overlap: usize,
}

impl Default for DelimiterChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl DelimiterChunker {
    /// Creates a chunker splitting on `###`, 1000-character sections and
    /// 200-character overlap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            max_section_size: DEFAULT_SECTION_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }

    /// Creates a chunker with a custom delimiter and default limits.
    #[must_use]
    pub fn with_delimiter(delimiter: &str) -> Self {
        Self {
            delimiter: delimiter.to_string(),
            ..Self::new()
        }
    }

    /// Sets the maximum section size in characters.
    #[must_use]
    pub const fn max_section_size(mut self, size: usize) -> Self {
        self.max_section_size = size;
        self
    }

    /// Sets the overlap between windows of a long section.
    #[must_use]
    pub const fn overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Returns the delimiter.
    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Yields `(byte_offset, section)` pairs between delimiters.
    fn sections<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        let mut sections = Vec::new();
        let mut start = 0;
        for (pos, _) in text.match_indices(self.delimiter.as_str()) {
            sections.push((start, &text[start..pos]));
            start = pos + self.delimiter.len();
        }
        sections.push((start, &text[start..]));
        sections
    }

    /// Windows one oversized section into overlapping pieces.
    fn window(&self, source: &str, section: &str, base: usize, out: &mut Vec<Chunk>) {
        let mut pos = 0;
        while pos < section.len() {
            let target = byte_offset_for_chars(section, pos, self.max_section_size);
            let end = if target >= section.len() {
                section.len()
            } else {
                self.find_best_boundary(section, pos, target)
            };

            push_trimmed(source, &section[pos..end], base + pos, out);

            if end >= section.len() {
                break;
            }

            let next = back_chars(section, end, self.overlap);
            pos = if next > pos { next } else { end };
        }
    }

    /// Finds the best cut at or before `target`, but after `start`.
    ///
    /// Prefers paragraph breaks > line breaks > sentence ends > spaces.
    fn find_best_boundary(&self, text: &str, start: usize, target: usize) -> usize {
        let window_bytes = (self.max_section_size / 5).max(1);
        let search_start = find_char_boundary(text, target.saturating_sub(window_bytes).max(start));
        let search_end = find_char_boundary(text, target);

        if search_start >= search_end {
            return search_end;
        }

        let region = &text[search_start..search_end];
        let accept = |offset: usize| {
            let boundary = search_start + offset;
            (boundary > start).then_some(boundary)
        };

        if let Some(b) = region.rfind("\n\n").and_then(|p| accept(p + 2)) {
            return b;
        }
        if let Some(b) = region.rfind('\n').and_then(|p| accept(p + 1)) {
            return b;
        }
        for (i, c) in region.char_indices().rev() {
            if matches!(c, '.' | '!' | '?') {
                let next = search_start + i + c.len_utf8();
                if (next >= text.len() || text[next..].starts_with([' ', '\n'])) && next > start {
                    return next;
                }
            }
        }
        if let Some(b) = region.rfind(' ').and_then(|p| accept(p + 1)) {
            return b;
        }

        search_end
    }
}

/// Steps back `n` characters from byte offset `end`.
fn back_chars(text: &str, end: usize, n: usize) -> usize {
    if n == 0 {
        return end;
    }
    text[..end]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map_or(0, |(i, _)| i)
}

/// Trims a piece and records it as a chunk unless it is blank.
fn push_trimmed(source: &str, piece: &str, offset: usize, out: &mut Vec<Chunk>) {
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = piece.len() - piece.trim_start().len();
    let start = offset + lead;
    let index = out.len();
    out.push(Chunk::new(
        source,
        trimmed.to_string(),
        start..start + trimmed.len(),
        index,
    ));
}

impl Chunker for DelimiterChunker {
    fn chunk(&self, source: &str, text: &str) -> Result<Vec<Chunk>> {
        self.validate()?;

        let mut chunks = Vec::new();
        for (offset, section) in self.sections(text) {
            if section.trim().chars().count() <= self.max_section_size {
                push_trimmed(source, section, offset, &mut chunks);
            } else {
                let lead = section.len() - section.trim_start().len();
                let body = section.trim();
                self.window(source, body, offset + lead, &mut chunks);
            }
        }
        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "delimiter"
    }

    fn description(&self) -> &'static str {
        "Splits on a literal section delimiter, windowing oversized sections with overlap"
    }

    fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(ChunkingError::InvalidConfig {
                reason: "delimiter must not be empty".to_string(),
            }
            .into());
        }
        if self.max_section_size == 0 {
            return Err(ChunkingError::InvalidConfig {
                reason: "max_section_size must be > 0".to_string(),
            }
            .into());
        }
        if self.overlap >= self.max_section_size {
            return Err(ChunkingError::OverlapTooLarge {
                overlap: self.overlap,
                size: self.max_section_size,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_sections_two_chunks() {
        let text = "### customers\nid uuid primary key\n### loans\nprincipal numeric";
        let chunks = DelimiterChunker::new().chunk("docs/schema.txt", text).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "customers\nid uuid primary key");
        assert_eq!(chunks[1].content, "loans\nprincipal numeric");
        assert!(chunks.iter().all(|c| c.source == "docs/schema.txt"));
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn test_empty_sections_dropped() {
        let text = "###\n\n###   ###customers\n###\n";
        let chunks = DelimiterChunker::new().chunk("a.txt", text).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "customers");
    }

    #[test]
    fn test_preamble_before_first_delimiter_kept() {
        let text = "Banking schema notes\n### branches\nname text";
        let chunks = DelimiterChunker::new().chunk("a.txt", text).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "Banking schema notes");
    }

    #[test]
    fn test_empty_document() {
        let chunks = DelimiterChunker::new().chunk("a.txt", "").unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_byte_ranges_point_at_content() {
        let text = "###  customers  ###\nloans\n";
        let chunks = DelimiterChunker::new().chunk("a.txt", text).unwrap();
        for chunk in &chunks {
            assert_eq!(&text[chunk.byte_range.clone()], chunk.content);
        }
    }

    #[test]
    fn test_custom_delimiter() {
        let chunks = DelimiterChunker::with_delimiter("---")
            .chunk("a.txt", "one---two---three")
            .unwrap();
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_oversized_section_is_windowed() {
        let sentence = "Every loan row has a principal and a status. ";
        let section = sentence.repeat(10);
        let chunker = DelimiterChunker::new().max_section_size(100).overlap(20);
        let chunks = chunker.chunk("a.txt", &section).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.content.is_empty());
            assert!(chunk.content.chars().count() <= 100);
            assert_eq!(&section[chunk.byte_range.clone()], chunk.content);
        }
        // Windows overlap
        for pair in chunks.windows(2) {
            assert!(pair[1].byte_range.start < pair[0].byte_range.end);
        }
    }

    #[test]
    fn test_windowing_multibyte_text() {
        let section = "₹".repeat(250);
        let chunker = DelimiterChunker::new().max_section_size(100).overlap(10);
        let chunks = chunker.chunk("a.txt", &section).unwrap();
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 100));
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        assert!(DelimiterChunker::with_delimiter("").validate().is_err());
        assert!(DelimiterChunker::new().max_section_size(0).validate().is_err());
        assert!(
            DelimiterChunker::new()
                .max_section_size(10)
                .overlap(10)
                .validate()
                .is_err()
        );
        assert!(DelimiterChunker::new().validate().is_ok());
    }

    #[test]
    fn test_back_chars() {
        assert_eq!(back_chars("abcdef", 6, 2), 4);
        assert_eq!(back_chars("abcdef", 6, 0), 6);
        assert_eq!(back_chars("abc", 3, 10), 0);
    }
}
