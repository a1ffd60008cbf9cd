//! Tools the agent can call by name.
//!
//! Each tool takes a single string input and returns text that is fed back
//! to the language model as an observation.


use ignore::WalkBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ToolsConfig;
use crate::retrieval::Retriever;
use crate::{InspectorError, Result};

/// Number of knowledge-base chunks returned by `rag_search`
pub const RAG_SEARCH_TOP_K: usize = 4;
pub const RAG_SEARCH_SEPARATOR: &str = "\n---\n";
pub const NO_RESULTS_MESSAGE: &str = "No relevant information found.";
pub const TRUNCATION_MARKER: &str = "... (more files truncated)";

pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn run(&self, input: &str) -> Result<String>;
}

/// Tool registry keyed by tool name
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `rag_search`, `list_repo_files` and `read_file`
    #[inline]
    pub fn with_defaults(retriever: Arc<Retriever>, config: &ToolsConfig) -> Self {
        let mut registry = Self::new();
        registry.register(RagSearchTool::new(retriever));
        registry.register(ListRepoFilesTool::new(
            &config.repo_root,
            config.max_listed_files,
        ));
        registry.register(ReadFileTool::new(&config.repo_root, config.max_read_chars));
        registry
    }

    /// Register a tool, replacing any tool with the same name
    #[inline]
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(Box::as_ref)
    }

    /// Registered tool names, sorted
    #[inline]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `(name, description)` for every registered tool, sorted by name
    #[inline]
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        let mut descriptions: Vec<(&str, &str)> = self
            .tools
            .iter()
            .map(|(name, tool)| (name.as_str(), tool.description()))
            .collect();
        descriptions.sort_unstable_by_key(|(name, _)| *name);
        descriptions
    }

    #[inline]
    pub fn run(&self, name: &str, input: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| InspectorError::Tool(format!("Tool '{name}' not found.")))?;

        debug!("Running tool {} with input {:?}", name, input);
        tool.run(input)
    }
}

/// Knowledge-base search over the shared retriever
pub struct RagSearchTool {
    retriever: Arc<Retriever>,
}

impl RagSearchTool {
    #[inline]
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self { retriever }
    }
}

impl Tool for RagSearchTool {
    #[inline]
    fn name(&self) -> &'static str {
        "rag_search"
    }

    #[inline]
    fn description(&self) -> &'static str {
        "Search the local knowledge base for passages relevant to the input"
    }

    #[inline]
    fn run(&self, input: &str) -> Result<String> {
        let chunks = self.retriever.retrieve(input, RAG_SEARCH_TOP_K)?;
        if chunks.is_empty() {
            return Ok(NO_RESULTS_MESSAGE.to_string());
        }
        Ok(chunks.join(RAG_SEARCH_SEPARATOR))
    }
}

/// Lists files under the repository root, honouring ignore files
pub struct ListRepoFilesTool {
    root: PathBuf,
    max_files: usize,
}

impl ListRepoFilesTool {
    #[inline]
    pub fn new(root: impl Into<PathBuf>, max_files: usize) -> Self {
        Self {
            root: root.into(),
            max_files,
        }
    }

    /// Every non-ignored file below the root as a `/`-separated relative path
    #[inline]
    pub fn collect_files(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(InspectorError::Tool(format!(
                "Repository root not found: {}",
                self.root.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkBuilder::new(&self.root).require_git(false).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path while listing files: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_none_or(|ft| ft.is_dir()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                files.push(display_relative(relative));
            }
        }

        files.sort_unstable();
        Ok(files)
    }
}

impl Tool for ListRepoFilesTool {
    #[inline]
    fn name(&self) -> &'static str {
        "list_repo_files"
    }

    #[inline]
    fn description(&self) -> &'static str {
        "List files in the repository (input is ignored)"
    }

    #[inline]
    fn run(&self, _input: &str) -> Result<String> {
        let mut files = self.collect_files()?;
        if files.len() > self.max_files {
            files.truncate(self.max_files);
            files.push(TRUNCATION_MARKER.to_string());
        }
        Ok(files.join("\n"))
    }
}

/// Reads a file relative to the repository root, truncated to a character limit
pub struct ReadFileTool {
    root: PathBuf,
    max_chars: usize,
}

impl ReadFileTool {
    #[inline]
    pub fn new(root: impl Into<PathBuf>, max_chars: usize) -> Self {
        Self {
            root: root.into(),
            max_chars,
        }
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let not_found = || InspectorError::Tool(format!("File not found: {relative}"));

        let root = self.root.canonicalize().map_err(|_| not_found())?;
        let path = root.join(relative).canonicalize().map_err(|_| not_found())?;

        if !path.starts_with(&root) {
            return Err(InspectorError::Tool(format!(
                "Refusing to read outside the repository: {relative}"
            )));
        }
        if !path.is_file() {
            return Err(not_found());
        }
        Ok(path)
    }
}

impl Tool for ReadFileTool {
    #[inline]
    fn name(&self) -> &'static str {
        "read_file"
    }

    #[inline]
    fn description(&self) -> &'static str {
        "Read a repository file given its path relative to the repository root"
    }

    #[inline]
    fn run(&self, input: &str) -> Result<String> {
        let relative = input.trim().trim_matches(|c| c == '\'' || c == '"');
        let path = self.resolve(relative)?;

        let content = fs::read_to_string(&path)
            .map_err(|e| InspectorError::Tool(format!("Error reading file {relative}: {e}")))?;

        Ok(content.chars().take(self.max_chars).collect())
    }
}

fn display_relative(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
