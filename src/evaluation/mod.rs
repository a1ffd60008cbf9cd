//! Keyword-based self-evaluation over a fixed question set.


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::{InspectorError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaItem {
    pub question: String,
    #[serde(default)]
    pub reference_answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub question: String,
    pub reference_answer: String,
    pub agent_answer: String,
    pub keywords: Vec<String>,
    pub keyword_hits: Vec<String>,
    pub all_keywords_present: bool,
    /// Set when answering failed; the answer is then empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub num_questions: usize,
    pub num_with_all_keywords: usize,
    pub keyword_coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    pub overall: OverallStats,
    pub results: Vec<QuestionResult>,
}

/// Load the question set from a JSON array of [`QaItem`]s
#[inline]
pub fn load_qa_set(path: &Path) -> Result<Vec<QaItem>> {
    let text = fs::read_to_string(path).map_err(|source| InspectorError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Keywords that occur in `answer`, compared case-insensitively
#[inline]
pub fn keyword_hits(answer: &str, keywords: &[String]) -> Vec<String> {
    let answer = answer.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| answer.contains(&keyword.to_lowercase()))
        .cloned()
        .collect()
}

/// Answer the first `max_questions` items (all when `None`) and score them.
///
/// A failed answer is recorded on its question and counts as a miss.
#[inline]
pub fn evaluate<F>(items: &[QaItem], max_questions: Option<usize>, mut answer_fn: F) -> EvaluationReport
where
    F: FnMut(&str) -> Result<String>,
{
    let limit = max_questions.unwrap_or(items.len()).min(items.len());
    let mut results = Vec::with_capacity(limit);

    for (position, item) in items.iter().take(limit).enumerate() {
        info!("Evaluating Q{}: {}", position + 1, item.question);

        let (agent_answer, error) = match answer_fn(&item.question) {
            Ok(answer) => (answer, None),
            Err(e) => {
                warn!("Q{} failed: {}", position + 1, e);
                (String::new(), Some(e.to_string()))
            }
        };

        let hits = keyword_hits(&agent_answer, &item.keywords);
        let all_keywords_present = error.is_none() && hits.len() == item.keywords.len();

        results.push(QuestionResult {
            question: item.question.clone(),
            reference_answer: item.reference_answer.clone(),
            agent_answer,
            keywords: item.keywords.clone(),
            keyword_hits: hits,
            all_keywords_present,
            error,
        });
    }

    let num_questions = results.len();
    let num_with_all_keywords = results.iter().filter(|r| r.all_keywords_present).count();
    let keyword_coverage = if num_questions == 0 {
        0.0
    } else {
        num_with_all_keywords as f64 / num_questions as f64
    };

    EvaluationReport {
        generated_at: Utc::now(),
        overall: OverallStats {
            num_questions,
            num_with_all_keywords,
            keyword_coverage,
        },
        results,
    }
}
