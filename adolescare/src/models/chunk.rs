use serde::{Deserialize, Serialize};

/// A bounded fragment of one source document, used as the retrieval unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Document identifier (file stem of the source PDF).
    pub source: String,
    /// Ordinal of the chunk within its document.
    pub position: usize,
    /// 1-based page the chunk was cut from.
    #[serde(default)]
    pub page: usize,
}

impl Chunk {
    pub fn new(text: String, source: impl Into<String>, position: usize, page: usize) -> Self {
        Self {
            text,
            source: source.into(),
            position,
            page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}
