// Embeddings module
// Knowledge-base chunking and the embedding backends used by the vector index

pub mod chunking;
pub mod ollama;

pub use chunking::{Chunk, ChunkingConfig, chunk_text};
pub use ollama::OllamaClient;

use crate::Result;

/// Capability interface for anything that maps text to a fixed-length vector.
///
/// Implementations must be deterministic for a given model version and must
/// return vectors of the same dimensionality for every input.
pub trait Embedder: Send + Sync {
    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning one vector per input in the same order
    #[inline]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Identifier of the underlying model, used for logging
    fn model_name(&self) -> &str;
}
