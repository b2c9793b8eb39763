//! Token-budgeted text chunking for large documents
//!
//! Chunks are exact slices of the source: concatenating them in order gives
//! back the original document byte for byte.

use crate::tokens::{char_budget, estimate_tokens};

/// An ordered piece of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position in the document
    pub index: usize,

    /// Number of chunks the document was split into
    pub total: usize,

    /// Chunk text
    pub text: String,
}

/// Splits text into chunks under a token budget
pub struct TextChunker {
    max_tokens: usize,
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens: max_tokens.max(1),
        }
    }

    /// Chunk the given text
    ///
    /// Lines are kept whole where they fit. An oversized line is split
    /// between words, and a word longer than the whole budget is cut at
    /// character boundaries.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if estimate_tokens(text) <= self.max_tokens {
            return vec![text.to_string()];
        }

        let limit = char_budget(self.max_tokens);
        let mut acc = Accumulator::new(limit);

        for line in text.split_inclusive('\n') {
            let line_chars = line.chars().count();
            if line_chars <= limit {
                acc.push(line, line_chars);
                continue;
            }

            // Oversized line: start it on a fresh chunk, then go word by word
            acc.flush();
            for word in split_words(line) {
                let word_chars = word.chars().count();
                if word_chars <= limit {
                    acc.push(word, word_chars);
                } else {
                    for piece in split_at_char_limit(word, limit) {
                        acc.push(piece, piece.chars().count());
                    }
                }
            }
        }

        acc.finish()
    }

    /// Chunk the text and number the pieces
    pub fn chunk_document(&self, text: &str) -> Vec<Chunk> {
        let pieces = self.chunk(text);
        let total = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(idx, text)| Chunk {
                index: idx + 1,
                total,
                text,
            })
            .collect()
    }
}

/// Running buffer that flushes whenever the next piece would not fit
struct Accumulator {
    limit: usize,
    chunks: Vec<String>,
    current: String,
    current_chars: usize,
}

impl Accumulator {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            chunks: Vec::new(),
            current: String::new(),
            current_chars: 0,
        }
    }

    fn push(&mut self, piece: &str, piece_chars: usize) {
        if self.current_chars + piece_chars > self.limit {
            self.flush();
        }
        self.current.push_str(piece);
        self.current_chars += piece_chars;
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current));
            self.current_chars = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Split a line into words, each carrying its trailing whitespace
fn split_words(line: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut prev_whitespace = false;

    for (i, c) in line.char_indices() {
        if prev_whitespace && !c.is_whitespace() {
            words.push(&line[start..i]);
            start = i;
        }
        prev_whitespace = c.is_whitespace();
    }

    if start < line.len() {
        words.push(&line[start..]);
    }
    words
}

/// Split text into slices of at most `limit` characters
fn split_at_char_limit(text: &str, limit: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (i, _) in text.char_indices() {
        if count == limit {
            pieces.push(&text[start..i]);
            start = i;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_chunking_needed_for_small_text() {
        let chunker = TextChunker::new(100);
        let text = "Short text here.\nSecond line.";
        let chunks = chunker.chunk(text);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn test_empty_text() {
        let chunker = TextChunker::new(10);
        assert_eq!(chunker.chunk(""), vec![String::new()]);
    }

    #[test]
    fn test_uniform_lines_give_ceil_chunk_count() {
        // 100 lines of 10 chars = 250 tokens; budget 25 tokens = 100 chars
        let text = "123456789\n".repeat(100);
        let chunker = TextChunker::new(25);
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks.len(), 10);
        assert!(chunks.iter().all(|c| estimate_tokens(c) <= 25));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_lines_are_not_split_when_they_fit() {
        let text = "alpha beta gamma\ndelta epsilon zeta\neta theta iota\n";
        let chunker = TextChunker::new(5); // 20 chars
        let chunks = chunker.chunk(text);

        assert_eq!(
            chunks,
            vec![
                "alpha beta gamma\n".to_string(),
                "delta epsilon zeta\n".to_string(),
                "eta theta iota\n".to_string(),
            ]
        );
    }

    #[test]
    fn test_long_line_split_by_words() {
        let line = "word ".repeat(40); // 200 chars, one line
        let chunker = TextChunker::new(10); // 40 chars
        let chunks = chunker.chunk(&line);

        assert_eq!(chunks.len(), 5);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 40);
            assert!(chunk.starts_with("word"));
        }
        assert_eq!(chunks.concat(), line);
    }

    #[test]
    fn test_run_on_word_is_hard_cut() {
        let text = "a".repeat(100);
        let chunker = TextChunker::new(5); // 20 chars
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.len() == 20));
    }

    #[test]
    fn test_multibyte_hard_cut_respects_char_boundaries() {
        let text = "規".repeat(30);
        let chunker = TextChunker::new(2); // 8 chars
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].chars().count(), 8);
        assert_eq!(chunks[3].chars().count(), 6);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_chunk_document_numbers_pieces() {
        let text = "line one\n".repeat(20);
        let chunker = TextChunker::new(10);
        let chunks = chunker.chunk_document(&text);

        let total = chunks.len();
        assert!(total > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i + 1);
            assert_eq!(chunk.total, total);
        }
    }

    #[test]
    fn test_split_words_keeps_whitespace() {
        assert_eq!(split_words("  ab cd\n"), vec!["  ", "ab ", "cd\n"]);
    }
}
