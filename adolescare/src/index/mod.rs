//! Flat cosine-similarity index over the embedded corpus, persisted as JSON.
//!
//! The index is built once from the document loader and written to
//! `<path>/index.json`. Later starts reload that file without touching the
//! documents or the embedding provider, so a changed corpus is only picked up
//! after the directory is deleted or `--rebuild-index` is passed.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::embeddings::EmbeddingProvider;
use crate::error::{AppError, Result};
use crate::models::{Chunk, ScoredChunk};
use crate::processing::DocumentLoader;

const INDEX_FILE: &str = "index.json";
const INDEX_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    model: String,
    dimensions: usize,
    chunks: Vec<IndexedChunk>,
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    model: String,
    dimensions: usize,
    entries: Vec<IndexedChunk>,
}

impl VectorIndex {
    /// Pair chunks with their embeddings. All vectors must share one dimension.
    pub fn build(
        model: impl Into<String>,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
            return Err(AppError::Index(format!(
                "Inconsistent embedding dimensions: expected {dimensions}, got {}",
                bad.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        Ok(Self {
            model: model.into(),
            dimensions,
            entries,
        })
    }

    /// Load the persisted index, or build and persist it from the corpus.
    pub async fn load_or_build(
        dir: &Path,
        embeddings: &EmbeddingProvider,
        loader: &DocumentLoader,
        rebuild: bool,
    ) -> Result<Self> {
        if !rebuild {
            if let Some(index) = Self::load(dir).await? {
                if index.model != embeddings.model() {
                    return Err(AppError::Index(format!(
                        "Index at {} was built with '{}' but '{}' is configured; \
                         pass --rebuild-index to rebuild it",
                        dir.display(),
                        index.model,
                        embeddings.model()
                    )));
                }
                tracing::info!(
                    "Loaded cached vector index from {} ({} chunks)",
                    dir.display(),
                    index.len()
                );
                return Ok(index);
            }
        }

        tracing::info!("Building vector index from {} documents...", loader.paths().len());
        let loader = loader.clone();
        let chunks = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| AppError::Internal(format!("Document loader task failed: {e}")))??;

        let texts = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embeddings.embed_documents(texts).await?;
        let index = Self::build(embeddings.model(), chunks, vectors)?;

        index.save(dir).await?;
        tracing::info!(
            "Saved vector index to {} ({} chunks, {} dimensions)",
            dir.display(),
            index.len(),
            index.dimensions
        );

        Ok(index)
    }

    /// `Ok(None)` when no index has been persisted at `dir`.
    pub async fn load(dir: &Path) -> Result<Option<Self>> {
        let path = index_file(dir);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }

        let data = tokio::fs::read_to_string(&path).await?;
        let persisted: PersistedIndex = serde_json::from_str(&data).map_err(|e| {
            AppError::Index(format!("Corrupt index file {}: {e}", path.display()))
        })?;

        if persisted.version != INDEX_VERSION {
            return Err(AppError::Index(format!(
                "Unsupported index version {} in {}; pass --rebuild-index",
                persisted.version,
                path.display()
            )));
        }

        Ok(Some(Self {
            model: persisted.model,
            dimensions: persisted.dimensions,
            entries: persisted.chunks,
        }))
    }

    pub async fn save(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir).await?;

        let persisted = PersistedIndex {
            version: INDEX_VERSION,
            model: self.model.clone(),
            dimensions: self.dimensions,
            chunks: self.entries.clone(),
        };
        let data = serde_json::to_vec(&persisted)?;

        let path = index_file(dir);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Top `k` chunks by cosine similarity, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        if k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect()
    }

    /// Like [`search`](Self::search) but drops results scoring below
    /// `min_score`; may return fewer than `k`, including none.
    pub fn search_with_threshold(&self, query: &[f32], k: usize, min_score: f32) -> Vec<ScoredChunk> {
        self.search(query, k)
            .into_iter()
            .filter(|result| result.score >= min_score)
            .collect()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn index_file(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
