//! Knowledge-base retrieval: chunking, embedding and top-k cosine search.
//!
//! [`Retriever`] owns the knowledge-base source, the embedder and a lazily
//! built [`VectorIndex`]. The first query builds the index; later queries
//! share the same immutable index until it is rebuilt or invalidated.

pub mod index;
pub mod knowledge_base;

#[cfg(test)]
mod tests;

pub use index::{SearchResult, VectorIndex, cosine_similarity};
pub use knowledge_base::{FileKnowledgeBase, KnowledgeBase};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::embeddings::{Embedder, OllamaClient, chunk_text};
use crate::{InspectorError, Result};

/// Owned copy of a search hit, detached from the index it came from
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub content: String,
    pub chunk_index: usize,
    pub similarity_score: f32,
}

pub struct Retriever {
    source: Box<dyn KnowledgeBase>,
    embedder: Arc<dyn Embedder>,
    min_length: usize,
    index: Mutex<Option<Arc<VectorIndex>>>,
}

impl Retriever {
    #[inline]
    pub fn new(
        source: impl KnowledgeBase + 'static,
        embedder: Arc<dyn Embedder>,
        min_length: usize,
    ) -> Self {
        Self {
            source: Box::new(source),
            embedder,
            min_length,
            index: Mutex::new(None),
        }
    }

    /// Retriever over the configured knowledge-base file, embedding with Ollama
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = OllamaClient::new(&config.ollama)
            .map_err(|e| InspectorError::Config(format!("{e:#}")))?;

        Ok(Self::new(
            FileKnowledgeBase::new(&config.retrieval.knowledge_base),
            Arc::new(client),
            config.chunking.min_length,
        ))
    }

    /// Build the index now, replacing any existing one.
    ///
    /// On failure the previously installed index, if any, stays in place.
    #[inline]
    pub fn build(&self) -> Result<Arc<VectorIndex>> {
        let mut slot = self.lock_index();
        let index = Arc::new(self.build_index()?);
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    /// The current index, building it first if nothing has been built yet.
    ///
    /// Concurrent callers wait for a single build and share its result.
    #[inline]
    pub fn index(&self) -> Result<Arc<VectorIndex>> {
        let mut slot = self.lock_index();
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }

        debug!("Vector index not built yet, building on first use");
        let index = Arc::new(self.build_index()?);
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Drop the current index so the next query rebuilds it
    #[inline]
    pub fn invalidate(&self) {
        if self.lock_index().take().is_some() {
            info!("Vector index invalidated");
        }
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.lock_index().is_some()
    }

    /// Top-k chunks for `query` with their scores, most relevant first
    #[inline]
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let index = self.index()?;
        let results = index.query(query, top_k)?;

        Ok(results
            .into_iter()
            .map(|result| RetrievedChunk {
                content: result.chunk.content.clone(),
                chunk_index: result.chunk.chunk_index,
                similarity_score: result.similarity_score,
            })
            .collect())
    }

    /// Texts of the top-k chunks for `query`, most relevant first
    #[inline]
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        Ok(self
            .search(query, top_k)?
            .into_iter()
            .map(|chunk| chunk.content)
            .collect())
    }

    fn build_index(&self) -> Result<VectorIndex> {
        info!("Building vector index from {}", self.source.describe());

        let text = self.source.load()?;
        let chunks = chunk_text(&text, self.min_length);
        if chunks.is_empty() {
            warn!(
                "Knowledge base {} produced no chunks; queries will fail",
                self.source.describe()
            );
        }

        VectorIndex::build(chunks, Arc::clone(&self.embedder))
    }

    // The slot only ever holds a fully built index, so a poisoned lock is
    // still consistent.
    fn lock_index(&self) -> MutexGuard<'_, Option<Arc<VectorIndex>>> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
