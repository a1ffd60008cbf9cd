use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InspectorError>;

#[derive(Error, Debug)]
pub enum InspectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index is empty: the knowledge base produced no chunks")]
    EmptyIndex,

    #[error("Source unavailable: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod agent;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod evaluation;
mod http;
pub mod llm;
pub mod retrieval;
#[cfg(test)]
mod test_support;
pub mod tools;
