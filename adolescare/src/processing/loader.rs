use std::path::Path;

use crate::config::DocumentsConfig;
use crate::error::Result;
use crate::models::Chunk;

use super::chunker::TextChunker;
use super::extractor::{PageText, PdfExtractor};

/// Loads the configured corpus and cuts it into retrieval chunks.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    paths: Vec<String>,
    chunker: TextChunker,
}

impl DocumentLoader {
    pub fn new(config: &DocumentsConfig) -> Result<Self> {
        Ok(Self {
            paths: config.paths.clone(),
            chunker: TextChunker::from_config(config)?,
        })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Read every document. Any missing or unreadable file fails the whole load.
    pub fn load(&self) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();

        for path in &self.paths {
            let path = Path::new(path);
            let pages = PdfExtractor::extract_pages_from_path(path)?;
            let document_chunks = self.chunk_pages(&document_id(path), &pages);
            tracing::info!(
                "Loaded {} ({} pages, {} chunks)",
                path.display(),
                pages.len(),
                document_chunks.len()
            );
            chunks.extend(document_chunks);
        }

        Ok(chunks)
    }

    pub fn chunk_pages(&self, source: &str, pages: &[PageText]) -> Vec<Chunk> {
        pages
            .iter()
            .flat_map(|page| {
                self.chunker
                    .chunk(&page.text)
                    .into_iter()
                    .map(move |fragment| (page.number, fragment.content))
            })
            .enumerate()
            .map(|(position, (page, text))| Chunk::new(text, source, position, page))
            .collect()
    }
}

/// Document identifier: the file stem, or the whole path when there is none.
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
