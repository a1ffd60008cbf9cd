//! Intent routing around the language model.
//!
//! Every question is classified into an [`Intent`]; tool-backed intents run
//! one tool and hand its output to the model inside a fixed prompt. Answers
//! always end with a `Reflection:` line.

mod prompts;


use fancy_regex::Regex;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::evaluation::{self, EvaluationReport};
use crate::llm::{ChatClient, LanguageModel};
use crate::retrieval::Retriever;
use crate::tools::ToolRegistry;
use crate::{InspectorError, Result};

/// Tool name that triggers a self-evaluation over the QA set
pub const EVALUATION_TOOL: &str = "run_eval_on_qa_set";
pub const DEFAULT_REFLECTION: &str =
    "Reflection: I am fairly confident but could improve with deeper reasoning.";
const REFLECTION_MARKER: &str = "Reflection:";

static ACTION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)ACTION:\s*(\w+)\s*[\r\n]+INPUT:\s*(.*)").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Explicit `ACTION:` / `INPUT:` block
    ToolCall { tool: String, input: String },
    SocialPost,
    Architecture,
    ListFiles,
    ReadFile { path: String },
    SelfEvaluation,
    General,
}

impl Intent {
    /// Classify a question; earlier rules win
    #[inline]
    pub fn detect(query: &str) -> Self {
        if let Some((tool, input)) = parse_action_block(query) {
            return Self::ToolCall { tool, input };
        }

        let q = query.trim().to_lowercase();
        if q.contains("linkedin") || q.contains("social post") || q.contains("post") {
            Self::SocialPost
        } else if q.contains("how were you built") || q.contains("architecture") {
            Self::Architecture
        } else if q.contains("list") && q.contains("file") {
            Self::ListFiles
        } else if q.starts_with("read file:") {
            let path = query
                .split_once(':')
                .map(|(_, path)| path.trim().to_string())
                .unwrap_or_default();
            Self::ReadFile { path }
        } else if q.contains("evaluation") || q.contains("self eval") || q.contains("self-evaluation")
        {
            Self::SelfEvaluation
        } else {
            Self::General
        }
    }
}

fn parse_action_block(query: &str) -> Option<(String, String)> {
    let captures = match ACTION_BLOCK.captures(query) {
        Ok(captures) => captures?,
        Err(e) => {
            warn!("Failed to match action block: {}", e);
            return None;
        }
    };
    let tool = captures.get(1)?.as_str().trim().to_string();
    let input = captures
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some((tool, input))
}

/// Append the default reflection line unless the answer already has one
#[inline]
pub fn ensure_reflection(answer: &str) -> String {
    if answer.contains(REFLECTION_MARKER) {
        answer.trim().to_string()
    } else {
        format!("{answer}\n\n{DEFAULT_REFLECTION}").trim().to_string()
    }
}

/// Drop every line that starts with `Reflection:` (case-insensitive)
#[inline]
pub fn strip_reflection(answer: &str) -> String {
    answer
        .lines()
        .filter(|line| !line.trim().to_lowercase().starts_with("reflection:"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub struct Agent {
    llm: Arc<dyn LanguageModel>,
    tools: ToolRegistry,
    qa_set: PathBuf,
}

impl Agent {
    #[inline]
    pub fn new(llm: Arc<dyn LanguageModel>, tools: ToolRegistry, qa_set: impl Into<PathBuf>) -> Self {
        Self {
            llm,
            tools,
            qa_set: qa_set.into(),
        }
    }

    /// Agent wired to the configured chat endpoint, sharing `retriever` with its tools
    #[inline]
    pub fn from_config(config: &Config, retriever: Arc<Retriever>) -> Result<Self> {
        let llm = ChatClient::new(&config.llm)?;
        let tools = ToolRegistry::with_defaults(retriever, &config.tools);
        Ok(Self::new(Arc::new(llm), tools, &config.tools.qa_set))
    }

    #[inline]
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer a question, ending with a reflection line
    #[inline]
    pub fn answer(&self, query: &str) -> Result<String> {
        self.respond(query, true)
    }

    /// A first-person social post about the agent, without the reflection line
    #[inline]
    pub fn social_post(&self) -> Result<String> {
        let answer = self.answer(prompts::SOCIAL_POST_REQUEST)?;
        Ok(strip_reflection(&answer))
    }

    /// Run the QA set through the agent and score the answers
    #[inline]
    pub fn self_evaluate(&self, max_questions: Option<usize>) -> Result<EvaluationReport> {
        let items = evaluation::load_qa_set(&self.qa_set)?;
        info!(
            "Running self-evaluation on {} questions from {}",
            max_questions.map_or(items.len(), |max| max.min(items.len())),
            self.qa_set.display()
        );
        Ok(evaluation::evaluate(&items, max_questions, |question| {
            self.respond(question, false)
        }))
    }

    fn respond(&self, query: &str, allow_evaluation: bool) -> Result<String> {
        let intent = Intent::detect(query);
        debug!("Detected intent {:?}", intent);

        let prompt = match intent {
            Intent::ToolCall { tool, input } => {
                let observation = self.observe(&tool, &input, allow_evaluation);
                prompts::tool_summary(&observation)
            }
            Intent::SocialPost => prompts::social_post(query),
            Intent::Architecture => {
                let observation =
                    self.observe("rag_search", prompts::ARCHITECTURE_QUERY, allow_evaluation);
                prompts::architecture(&observation)
            }
            Intent::ListFiles => {
                let observation = self.observe("list_repo_files", "", allow_evaluation);
                prompts::list_files(&observation)
            }
            Intent::ReadFile { path } => {
                let observation = self.observe("read_file", &path, allow_evaluation);
                prompts::read_file(&path, &observation)
            }
            Intent::SelfEvaluation if allow_evaluation => {
                let observation = self.observe(EVALUATION_TOOL, "", allow_evaluation);
                prompts::self_evaluation(&observation)
            }
            Intent::SelfEvaluation | Intent::General => prompts::general(query),
        };

        let answer = self.llm.generate(&prompt)?;
        Ok(ensure_reflection(&answer))
    }

    /// Tool output, or an error line the model can read
    fn observe(&self, tool: &str, input: &str, allow_evaluation: bool) -> String {
        let result = match tool {
            EVALUATION_TOOL => self.run_evaluation_tool(allow_evaluation),
            _ if self.tools.get(tool).is_none() => {
                warn!("Unknown tool requested: {}", tool);
                return format!("Tool '{tool}' not found.");
            }
            _ => self.tools.run(tool, input),
        };

        result.unwrap_or_else(|e| {
            warn!("Tool {} failed: {}", tool, e);
            format!("Error running tool '{tool}': {e}")
        })
    }

    fn run_evaluation_tool(&self, allow_evaluation: bool) -> Result<String> {
        if !allow_evaluation {
            return Err(InspectorError::Tool(
                "self-evaluation is already running".to_string(),
            ));
        }
        let report = self.self_evaluate(None)?;
        Ok(serde_json::to_string_pretty(&report)?)
    }
}
