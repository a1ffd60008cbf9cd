use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{InspectorError, Result};

/// Supplies the raw knowledge-base text to chunk
pub trait KnowledgeBase: Send + Sync {
    fn load(&self) -> Result<String>;

    /// Human-readable origin, used in logs
    fn describe(&self) -> String;
}

/// Knowledge base stored as a UTF-8 text file
#[derive(Debug, Clone)]
pub struct FileKnowledgeBase {
    path: PathBuf,
}

impl FileKnowledgeBase {
    #[inline]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KnowledgeBase for FileKnowledgeBase {
    #[inline]
    fn load(&self) -> Result<String> {
        debug!("Loading knowledge base from {}", self.path.display());
        fs::read_to_string(&self.path).map_err(|source| InspectorError::SourceUnavailable {
            path: self.path.clone(),
            source,
        })
    }

    #[inline]
    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
