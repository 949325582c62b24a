use unicode_segmentation::UnicodeSegmentation;

use crate::config::DocumentsConfig;
use crate::error::{AppError, Result};

/// Fixed-size window chunker measured in grapheme clusters.
///
/// Consecutive windows share exactly `chunk_overlap` graphemes. A window end is
/// pulled back to the last whitespace inside the window when one exists past
/// the overlap region, so words are not split unless a single word is longer
/// than the window.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AppError::Validation(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Validation(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(config: &DocumentsConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let graphemes: Vec<&str> = text.graphemes(true).collect();
        if graphemes.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let mut end = (start + self.chunk_size).min(graphemes.len());

            if end < graphemes.len() && !is_whitespace(graphemes[end]) {
                if let Some(cut) = self.last_break(&graphemes, start, end) {
                    end = cut;
                }
            }

            let content = graphemes[start..end].concat();
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                chunks.push(TextChunk {
                    content: trimmed.to_string(),
                    offset: start,
                });
            }

            if end >= graphemes.len() {
                break;
            }

            start = end - self.chunk_overlap;
        }

        chunks
    }

    /// Last whitespace position strictly after the overlap region, so the next
    /// window always advances.
    fn last_break(&self, graphemes: &[&str], start: usize, end: usize) -> Option<usize> {
        let floor = start + self.chunk_overlap + 1;
        (floor..end)
            .rev()
            .find(|&i| is_whitespace(graphemes[i]))
    }
}

fn is_whitespace(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_whitespace)
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub content: String,
    /// Grapheme offset of the window start within the input.
    pub offset: usize,
}
