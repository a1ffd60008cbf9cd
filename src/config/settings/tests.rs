use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.ollama.protocol, "http");
    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.ollama.model, "nomic-embed-text:latest");
    assert_eq!(config.ollama.batch_size, 16);
    assert_eq!(config.chunking.min_length, 100);
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
    assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
    assert_eq!(config.tools.max_listed_files, 30);
    assert_eq!(config.tools.max_read_chars, 2500);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.ollama.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.batch_size = 1001;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.chunking.min_length = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidMinLength(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.retrieval.top_k = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTopK(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.llm.base_url = "not a url".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidUrl(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.llm.api_key_env = "  ".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidApiKeyEnv(_))
    ));

    let mut invalid_config = config;
    invalid_config.tools.max_read_chars = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidToolLimit("max_read_chars", 0))
    ));
}

#[test]
fn ollama_url_generation() {
    let config = Config::default();
    let url = config
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn chat_completions_url_handles_trailing_slash() {
    let mut llm = LlmConfig::default();
    let url = llm.chat_completions_url().expect("valid url");
    assert_eq!(
        url.as_str(),
        "https://api.groq.com/openai/v1/chat/completions"
    );

    llm.base_url = "http://127.0.0.1:8080/v1/".to_string();
    let url = llm.chat_completions_url().expect("valid url");
    assert_eq!(url.as_str(), "http://127.0.0.1:8080/v1/chat/completions");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_toml_uses_defaults() {
    let partial_toml = r#"
        [ollama]
        host = "custom-host"

        [chunking]
        min_length = 250
    "#;

    let config: Config = toml::from_str(partial_toml).expect("should parse partial toml");
    assert_eq!(config.ollama.host, "custom-host");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.chunking.min_length, 250);
    assert_eq!(config.retrieval, RetrievalConfig::default());
    assert_eq!(config.llm, LlmConfig::default());
}

#[test]
fn setter_validation() {
    let mut config = OllamaConfig {
        protocol: "http".to_string(),
        host: "localhost".to_string(),
        port: 11434,
        model: "test-model".to_string(),
        batch_size: 32,
    };

    assert!(config.set_protocol("https".to_string()).is_ok());
    assert!(config.set_host("example.com".to_string()).is_ok());
    assert!(config.set_port(8080).is_ok());
    assert!(config.set_model("new-model".to_string()).is_ok());
    assert!(config.set_batch_size(128).is_ok());

    assert!(config.set_protocol("ftp".to_string()).is_err());
    assert!(config.set_protocol("HTTP".to_string()).is_err());
    assert!(config.set_host(String::new()).is_err());
    assert!(config.set_port(0).is_err());
    assert!(config.set_model("   ".to_string()).is_err());
    assert!(config.set_batch_size(0).is_err());
    assert!(config.set_batch_size(1001).is_err());
}

#[test]
fn load_missing_config_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config::load(temp_dir.path()).expect("missing config falls back to defaults");

    assert_eq!(config.get_base_dir(), temp_dir.path());
    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.chunking, ChunkingConfig::default());
}

#[test]
fn save_and_reload() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let base_dir = temp_dir.path().join("nested");

    let mut config = Config {
        base_dir: base_dir.clone(),
        ..Config::default()
    };
    config.chunking.min_length = 300;
    config.retrieval.top_k = 8;
    config.llm.model = "llama-3.1-8b-instant".to_string();
    config.save().expect("config saves");

    assert!(config.config_file_path().exists());

    let loaded = Config::load(&base_dir).expect("config reloads");
    assert_eq!(loaded, config);
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join("config.toml"),
        "[retrieval]\ntop_k = 0\n",
    )
    .expect("write config");

    let result = Config::load(temp_dir.path());
    assert!(result.is_err());
}

#[test]
fn error_display_messages() {
    let errors = vec![
        ConfigError::InvalidProtocol("ftp".to_string()),
        ConfigError::InvalidPort(0),
        ConfigError::InvalidBatchSize(0),
        ConfigError::InvalidModel(String::new()),
        ConfigError::InvalidUrl("invalid-url".to_string()),
        ConfigError::InvalidMinLength(0),
        ConfigError::InvalidTimeout(0),
    ];

    for error in errors {
        let message = format!("{error}");
        assert!(message.len() > 10);
    }
}
