use anyhow::Result;
use clap::{Parser, Subcommand};
use rag_inspector::commands::{
    ask, chat, evaluate, index_knowledge_base, load_config, search, social_post,
};
use rag_inspector::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "rag-inspector")]
#[command(about = "An agentic RAG assistant that can inspect its own repository")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama, retrieval and language model settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Build the vector index from the knowledge base
    Index,
    /// Show the knowledge-base chunks most similar to a query
    Search {
        query: String,
        /// Number of chunks to return (defaults to the configured top_k)
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Ask the agent a single question
    Ask { query: String },
    /// Start an interactive question loop
    Chat,
    /// Run the self-evaluation question set
    Eval {
        /// Only evaluate the first N questions
        #[arg(long)]
        max: Option<usize>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a LinkedIn-style post about the agent
    Post,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Index => {
            index_knowledge_base(&load_config()?)?;
        }
        Commands::Search { query, top_k } => {
            search(&load_config()?, &query, top_k)?;
        }
        Commands::Ask { query } => {
            ask(&load_config()?, &query)?;
        }
        Commands::Chat => {
            chat(&load_config()?)?;
        }
        Commands::Eval { max, json } => {
            evaluate(&load_config()?, max, json)?;
        }
        Commands::Post => {
            social_post(&load_config()?)?;
        }
    }

    Ok(())
}
