
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separator placed between paragraphs merged into one chunk
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// A passage of the knowledge base treated as one retrievable unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk text
    pub content: String,
    /// Position of this chunk among all chunks produced from the source
    pub chunk_index: usize,
}

impl Chunk {
    /// Length in characters, not bytes
    #[inline]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// The paragraphs this chunk was assembled from
    #[inline]
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content.split(PARAGRAPH_SEPARATOR)
    }
}

/// Configuration for knowledge-base chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Soft lower bound on chunk length in characters; short paragraphs are
    /// merged with their successors until a chunk reaches it
    pub min_length: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self { min_length: 100 }
    }
}

/// Split text into trimmed, non-empty paragraphs on blank-line boundaries
#[inline]
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Chunk knowledge-base text into passages of at least `min_length` characters.
///
/// Paragraphs are accumulated into a buffer; while the buffer is shorter than
/// `min_length` the next paragraph is appended to it, otherwise the buffer is
/// closed as a chunk. The final buffer is always emitted, even when short.
/// Chunks are never split, so `min_length` is not a maximum.
#[inline]
pub fn chunk_text(text: &str, min_length: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0;

    for paragraph in split_paragraphs(text) {
        let paragraph_len = paragraph.chars().count();

        if buffer.is_empty() {
            buffer = paragraph;
            buffer_len = paragraph_len;
        } else if buffer_len < min_length {
            buffer.push_str(PARAGRAPH_SEPARATOR);
            buffer.push_str(&paragraph);
            buffer_len += PARAGRAPH_SEPARATOR.len() + paragraph_len;
        } else {
            let chunk_index = chunks.len();
            chunks.push(Chunk {
                content: std::mem::replace(&mut buffer, paragraph),
                chunk_index,
            });
            buffer_len = paragraph_len;
        }
    }

    if !buffer.is_empty() {
        let chunk_index = chunks.len();
        chunks.push(Chunk {
            content: buffer,
            chunk_index,
        });
    }

    debug!(
        "Chunked {} characters into {} chunks (min length {})",
        text.len(),
        chunks.len(),
        min_length
    );

    chunks
}
