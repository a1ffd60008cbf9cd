use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::agent::Agent;
use crate::config::Config;
use crate::evaluation::EvaluationReport;
use crate::retrieval::Retriever;

/// Characters of each answer shown in the evaluation summary
const ANSWER_PREVIEW_CHARS: usize = 400;

#[inline]
pub fn load_config() -> Result<Config> {
    Config::load_default().context("Failed to load configuration")
}

/// Spinner on an attended terminal, hidden otherwise
fn spinner(message: &'static str) -> ProgressBar {
    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn build_agent(config: &Config) -> Result<Agent> {
    let retriever = Retriever::from_config(config).context("Failed to create retriever")?;
    Agent::from_config(config, Arc::new(retriever)).context("Failed to create agent")
}

/// Build the vector index eagerly and report its shape
#[inline]
pub fn index_knowledge_base(config: &Config) -> Result<()> {
    info!(
        "Indexing knowledge base {}",
        config.retrieval.knowledge_base.display()
    );
    let retriever = Retriever::from_config(config).context("Failed to create retriever")?;

    let bar = spinner("Embedding knowledge base...");
    let result = retriever.build();
    bar.finish_and_clear();
    let index = result.context("Failed to build vector index")?;

    println!("✅ Vector index built");
    println!(
        "   Knowledge base: {}",
        config.retrieval.knowledge_base.display()
    );
    println!("   Chunks: {}", index.len());
    println!("   Dimension: {}", index.dimension());
    println!("   Embedding model: {}", index.model_name());

    Ok(())
}

/// Print the top-k chunks for `query` with their similarity scores
#[inline]
pub fn search(config: &Config, query: &str, top_k: Option<usize>) -> Result<()> {
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let retriever = Retriever::from_config(config).context("Failed to create retriever")?;

    let bar = spinner("Searching...");
    let result = retriever.search(query, top_k);
    bar.finish_and_clear();
    let results = result.context("Search failed")?;

    println!("Top {} results for: {}", results.len(), style(query).cyan());
    for (rank, chunk) in results.iter().enumerate() {
        println!();
        println!(
            "{} score {:.4} (chunk {})",
            style(format!("#{}", rank + 1)).bold(),
            chunk.similarity_score,
            chunk.chunk_index
        );
        println!("{}", chunk.content);
    }

    Ok(())
}

/// Answer a single question
#[inline]
pub fn ask(config: &Config, query: &str) -> Result<()> {
    let agent = build_agent(config)?;

    let bar = spinner("Agent is thinking...");
    let result = agent.answer(query);
    bar.finish_and_clear();

    println!("{}", result.context("Failed to answer question")?);
    Ok(())
}

/// Interactive question loop; `exit`, `quit` or end of input leaves
#[inline]
pub fn chat(config: &Config) -> Result<()> {
    let agent = build_agent(config)?;

    eprintln!("{}", style("Agentic RAG Repo Inspector").bold().cyan());
    eprintln!("Ask about the knowledge base or this repository. Examples:");
    eprintln!("  - What is RAG and why is it used here?");
    eprintln!("  - How were you built?");
    eprintln!("  - Please list repository files.");
    eprintln!("  - Read file: README.md");
    eprintln!("  - Run a self evaluation.");
    eprintln!("Available tools:");
    for (name, description) in agent.tools().descriptions() {
        eprintln!("  {} {}", style(name).bold(), description);
    }
    eprintln!("Type 'exit' or 'quit' to leave.");
    eprintln!();

    while let Ok(line) = Input::<String>::new()
        .with_prompt("You")
        .allow_empty(true)
        .interact_text()
    {
        let query = line.trim();
        if is_exit_command(query) {
            break;
        }
        if query.is_empty() {
            continue;
        }

        let bar = spinner("Agent is thinking...");
        let result = agent.answer(query);
        bar.finish_and_clear();

        match result {
            Ok(answer) => println!("\n{}\n{answer}\n", style("Agent>").bold().green()),
            Err(e) => {
                error!("Failed to answer {:?}: {}", query, e);
                eprintln!("{}", style(format!("Error: {e}")).red());
            }
        }
    }

    eprintln!("Exiting. Goodbye!");
    Ok(())
}

/// Run the QA set and print a summary, or the full report as JSON
#[inline]
pub fn evaluate(config: &Config, max_questions: Option<usize>, json: bool) -> Result<()> {
    let agent = build_agent(config)?;
    let report = agent
        .self_evaluate(max_questions)
        .context("Self-evaluation failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print!("{}", ReportSummary(&report));
    }
    Ok(())
}

/// Print a social post written by the agent about itself
#[inline]
pub fn social_post(config: &Config) -> Result<()> {
    let agent = build_agent(config)?;

    let bar = spinner("Writing post...");
    let result = agent.social_post();
    bar.finish_and_clear();
    let post = result.context("Failed to generate post")?;

    let rule = "=".repeat(36);
    println!("{rule}\nGenerated LinkedIn-style Post\n{rule}\n");
    println!("{post}");
    println!("\n{rule}");
    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn preview(answer: &str, max_chars: usize) -> String {
    let mut short: String = answer.chars().take(max_chars).collect::<String>().replace('\n', " ");
    if answer.chars().count() > max_chars {
        short.push_str(" ...");
    }
    short
}

/// Human-readable evaluation summary with per-question details
struct ReportSummary<'a>(&'a EvaluationReport);

impl fmt::Display for ReportSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overall = &self.0.overall;

        writeln!(f, "=== Evaluation Summary ===")?;
        writeln!(f, "Number of questions: {}", overall.num_questions)?;
        writeln!(
            f,
            "Questions with all keywords present: {}",
            overall.num_with_all_keywords
        )?;
        writeln!(f, "Keyword coverage: {:.2}", overall.keyword_coverage)?;

        writeln!(f, "\n=== Per-question details ===")?;
        for (position, result) in self.0.results.iter().enumerate() {
            writeln!(f, "\nQ{}: {}", position + 1, result.question)?;
            writeln!(f, "Reference: {}", result.reference_answer)?;
            if let Some(error) = &result.error {
                writeln!(f, "Error: {error}")?;
            } else {
                writeln!(
                    f,
                    "Agent answer (trimmed): {}",
                    preview(&result.agent_answer, ANSWER_PREVIEW_CHARS)
                )?;
            }
            writeln!(f, "Keywords: {}", result.keywords.join(", "))?;
            writeln!(f, "Keyword hits: {}", result.keyword_hits.join(", "))?;
            writeln!(f, "All keywords present: {}", result.all_keywords_present)?;
        }
        Ok(())
    }
}
