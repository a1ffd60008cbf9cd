// Configuration management: TOML settings plus the interactive editor

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    CONFIG_DIR_ENV, Config, ConfigError, LlmConfig, OllamaConfig, RetrievalConfig, ToolsConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
