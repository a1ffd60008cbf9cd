
use itertools::Itertools;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::embeddings::{Chunk, Embedder};
use crate::{InspectorError, Result};

/// Added to the cosine denominator so zero vectors score 0 instead of NaN
const SIMILARITY_EPSILON: f32 = 1e-10;

/// In-memory index pairing each chunk with its embedding.
///
/// The index owns the embedder that produced its vectors and uses it for
/// every query, so chunk and query vectors always come from the same model.
/// It is immutable once built.
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    dimension: usize,
    embedder: Arc<dyn Embedder>,
}

/// A chunk scored against a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult<'a> {
    pub chunk: &'a Chunk,
    pub similarity_score: f32,
}

impl VectorIndex {
    /// Embed every chunk in order and build the index.
    ///
    /// Fails without producing an index if the embedder errors, returns the
    /// wrong number of vectors, or returns vectors of differing dimensionality.
    #[inline]
    pub fn build(chunks: Vec<Chunk>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if chunks.is_empty() {
            debug!("Building empty vector index");
            return Ok(Self {
                chunks,
                embeddings: Vec::new(),
                dimension: 0,
                embedder,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).map_err(as_embedding_error)?;

        if embeddings.len() != chunks.len() {
            return Err(InspectorError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(InspectorError::Embedding(
                "Embedder returned an empty vector for chunk 0".to_string(),
            ));
        }

        if let Some((position, embedding)) = embeddings
            .iter()
            .find_position(|embedding| embedding.len() != dimension)
        {
            return Err(InspectorError::Embedding(format!(
                "Inconsistent embedding dimensions: chunk 0 has {}, chunk {} has {}",
                dimension,
                position,
                embedding.len()
            )));
        }

        if let Some((position, _)) = embeddings
            .iter()
            .find_position(|embedding| !is_finite_vector(embedding))
        {
            return Err(InspectorError::Embedding(format!(
                "Embedding for chunk {position} contains a non-finite value"
            )));
        }

        info!(
            "Built vector index with {} chunks ({} dimensions, model {})",
            chunks.len(),
            dimension,
            embedder.model_name()
        );

        Ok(Self {
            chunks,
            embeddings,
            dimension,
            embedder,
        })
    }

    /// Return the `top_k` chunks most similar to `text`, most relevant first.
    ///
    /// `top_k` is clamped to `[1, len]`. Equal scores keep chunk order.
    #[inline]
    pub fn query(&self, text: &str, top_k: usize) -> Result<Vec<SearchResult<'_>>> {
        if self.is_empty() {
            return Err(InspectorError::EmptyIndex);
        }

        let query_embedding = self.embedder.embed(text).map_err(as_embedding_error)?;
        if query_embedding.len() != self.dimension {
            return Err(InspectorError::Embedding(format!(
                "Query embedding has {} dimensions, index has {}",
                query_embedding.len(),
                self.dimension
            )));
        }
        if !is_finite_vector(&query_embedding) {
            return Err(InspectorError::Embedding(
                "Query embedding contains a non-finite value".to_string(),
            ));
        }

        let top_k = top_k.clamp(1, self.len());

        let results: Vec<SearchResult<'_>> = self
            .chunks
            .iter()
            .zip(&self.embeddings)
            .map(|(chunk, embedding)| SearchResult {
                chunk,
                similarity_score: cosine_similarity(&query_embedding, embedding),
            })
            .sorted_by(|a, b| {
                b.similarity_score
                    .total_cmp(&a.similarity_score)
                    .then_with(|| a.chunk.chunk_index.cmp(&b.chunk.chunk_index))
            })
            .take(top_k)
            .collect();

        debug!(
            "Query matched {} chunks (best score {:.4})",
            results.len(),
            results.first().map_or(0.0, |r| r.similarity_score)
        );

        Ok(results)
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Embedding rows aligned by position with [`Self::chunks`]
    #[inline]
    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// Vector dimensionality, 0 for an empty index
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }
}

impl fmt::Debug for VectorIndex {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorIndex")
            .field("chunks", &self.chunks.len())
            .field("dimension", &self.dimension)
            .field("model", &self.embedder.model_name())
            .finish()
    }
}

// Embedder failures surface as `Embedding` whatever variant the backend used
fn as_embedding_error(error: InspectorError) -> InspectorError {
    match error {
        InspectorError::Embedding(_) => error,
        other => InspectorError::Embedding(other.to_string()),
    }
}

fn is_finite_vector(vector: &[f32]) -> bool {
    vector.iter().all(|value| value.is_finite())
}

/// `dot(a, b) / (|a| * |b| + ε)`
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    dot / norm_a.mul_add(norm_b, SIMILARITY_EPSILON)
}
