use std::path::Path;

use crate::error::{AppError, Result};

/// Text of one PDF page.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number.
    pub number: usize,
    pub text: String,
}

pub struct PdfExtractor;

impl PdfExtractor {
    pub fn extract_pages_from_path(path: &Path) -> Result<Vec<PageText>> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::Document(format!("Failed to read {}: {e}", path.display()))
        })?;

        Self::extract_pages(&bytes).map_err(|e| match e {
            AppError::Document(msg) => AppError::Document(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn extract_pages(bytes: &[u8]) -> Result<Vec<PageText>> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| AppError::Document(format!("PDF extraction failed: {e}")))?;

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                number: i + 1,
                text: normalize_whitespace(&text),
            })
            .collect())
    }
}

/// Collapse runs of whitespace (PDF line wraps, column gaps) to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
