mod chunker;
mod extractor;
mod loader;

pub use chunker::{TextChunk, TextChunker};
pub use extractor::{normalize_whitespace, PageText, PdfExtractor};
pub use loader::{document_id, DocumentLoader};
