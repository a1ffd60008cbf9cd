
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

use super::{Config, ConfigError, LlmConfig, OllamaConfig};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 RAG Inspector Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Ollama Configuration").bold().yellow());
    eprintln!("Configure your local Ollama instance for embedding generation.");
    eprintln!();

    configure_ollama(&mut config.ollama)?;

    eprintln!();
    eprintln!("{}", style("Retrieval Configuration").bold().yellow());
    configure_retrieval(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Language Model Configuration").bold().yellow());
    configure_llm(&mut config.llm)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_ollama_connection(&config.ollama) {
        eprintln!("{}", style("✓ Ollama connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Ollama").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before asking questions.");
    }

    if std::env::var_os(&config.llm.api_key_env).is_none() {
        eprintln!(
            "{}",
            style(format!(
                "⚠ Warning: {} is not set; LLM calls will fail until it is",
                config.llm.api_key_env
            ))
            .yellow()
        );
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Ollama Settings:").bold().yellow());
    eprintln!("  Host: {}", style(&config.ollama.host).cyan());
    eprintln!("  Port: {}", style(config.ollama.port).cyan());
    eprintln!("  Model: {}", style(&config.ollama.model).cyan());
    eprintln!("  Batch Size: {}", style(config.ollama.batch_size).cyan());
    match config.ollama_url() {
        Ok(url) => eprintln!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Ollama URL: {} ({})", style("Invalid").red(), e),
    }

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!(
        "  Knowledge base: {}",
        style(config.retrieval.knowledge_base.display()).cyan()
    );
    eprintln!(
        "  Minimum chunk length: {}",
        style(config.chunking.min_length).cyan()
    );
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());

    eprintln!();
    eprintln!("{}", style("LLM Settings:").bold().yellow());
    eprintln!("  Endpoint: {}", style(&config.llm.base_url).cyan());
    eprintln!("  Model: {}", style(&config.llm.model).cyan());
    let key_state = if std::env::var_os(&config.llm.api_key_env).is_some() {
        style("set").green()
    } else {
        style("missing").red()
    };
    eprintln!(
        "  API key: {} ({})",
        style(&config.llm.api_key_env).cyan(),
        key_state
    );

    eprintln!();
    eprintln!("Config file: {}", style(config.config_file_path().display()).dim());

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    Config::load_default().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            let base_dir = Config::config_dir().context("Failed to resolve config directory")?;
            Ok(Config {
                base_dir,
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == ollama.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;

    let protocol = protocols[protocol_index].to_string();

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = OllamaConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..OllamaConfig::default()
            };
            temp_config.validate()
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(ollama.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(ollama.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(ollama.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    ollama.set_protocol(protocol)?;
    ollama.set_host(host)?;
    ollama.set_port(port)?;
    ollama.set_model(model)?;
    ollama.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_retrieval(config: &mut Config) -> Result<()> {
    let knowledge_base: String = Input::new()
        .with_prompt("Knowledge base file")
        .default(config.retrieval.knowledge_base.display().to_string())
        .interact_text()?;

    let min_length: usize = Input::new()
        .with_prompt("Minimum chunk length (characters)")
        .default(config.chunking.min_length)
        .validate_with(|input: &usize| -> Result<(), ConfigError> {
            if (1..=10_000).contains(input) {
                Ok(())
            } else {
                Err(ConfigError::InvalidMinLength(*input))
            }
        })
        .interact_text()?;

    let top_k: usize = Input::new()
        .with_prompt("Chunks to retrieve per query")
        .default(config.retrieval.top_k)
        .validate_with(|input: &usize| -> Result<(), ConfigError> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err(ConfigError::InvalidTopK(*input))
            }
        })
        .interact_text()?;

    config.retrieval.knowledge_base = PathBuf::from(knowledge_base);
    config.chunking.min_length = min_length;
    config.retrieval.top_k = top_k;

    Ok(())
}

fn configure_llm(llm: &mut LlmConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("Chat completions base URL")
        .default(llm.base_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            LlmConfig {
                base_url: input.clone(),
                ..LlmConfig::default()
            }
            .validate()
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Chat model")
        .default(llm.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("Environment variable holding the API key")
        .default(llm.api_key_env.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Variable name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    llm.base_url = base_url;
    llm.model = model;
    llm.api_key_env = api_key_env;

    Ok(())
}

fn test_ollama_connection(ollama: &OllamaConfig) -> bool {
    let url = format!(
        "{}://{}:{}/api/version",
        ollama.protocol, ollama.host, ollama.port
    );

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    match agent.get(&url).call() {
        Ok(_) => true,
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => true,
        Err(_) => false,
    }
}
