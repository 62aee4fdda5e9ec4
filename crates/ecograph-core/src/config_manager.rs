use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Providers understood by the LLM factory
pub const SUPPORTED_LLM_PROVIDERS: &[&str] =
    &["openai", "openai-compatible", "lmstudio", "ollama", "anthropic"];

/// Main configuration for EcoGraph
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EcoGraphConfig {
    /// Language model used for query generation and answer synthesis
    #[serde(default)]
    pub llm: LLMConfig,

    /// Graph database connection
    #[serde(default)]
    pub graph: GraphConfig,

    /// Question-to-query pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// LLM provider: "openai", "openai-compatible", "lmstudio", "ollama", "anthropic"
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model identifier
    /// For OpenAI: model name (e.g., "gpt-4o-mini")
    /// For Ollama: model name (e.g., "llama3.1:8b")
    /// For Anthropic: model name (e.g., "claude-3-5-sonnet-20241022")
    /// For LM Studio / OpenAI-compatible: whatever the server exposes
    #[serde(default)]
    pub model: Option<String>,

    /// LM Studio URL
    #[serde(default = "default_lmstudio_url")]
    pub lmstudio_url: String,

    /// Ollama URL
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// OpenAI-compatible base URL (for custom endpoints)
    #[serde(default)]
    pub openai_compatible_url: Option<String>,

    /// OpenAI API key
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    /// Context window size
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport-level retries per model call (0 = single attempt)
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: None,
            lmstudio_url: default_lmstudio_url(),
            ollama_url: default_ollama_url(),
            openai_compatible_url: None,
            openai_api_key: None,
            anthropic_api_key: None,
            context_window: default_context_window(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

/// Graph database (Neo4j / Bolt) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Bolt URI, e.g. "bolt://localhost:7687" or "neo4j+s://xxxx.databases.neo4j.io"
    #[serde(default = "default_graph_uri")]
    pub uri: String,

    #[serde(default = "default_graph_username")]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Target database (server default when unset)
    #[serde(default)]
    pub database: Option<String>,

    /// Derive the schema descriptor from the live label/relationship inventory
    #[serde(default)]
    pub live_schema: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_graph_uri(),
            username: default_graph_username(),
            password: String::new(),
            database: None,
            live_schema: false,
        }
    }
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum rows forwarded from execution into answer synthesis
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Fraction of a keyword pattern that must match for a template to be chosen
    #[serde(default = "default_template_threshold")]
    pub template_threshold: f32,

    /// Questions longer than this are rejected before any external call
    #[serde(default = "default_max_question_chars")]
    pub max_question_chars: usize,

    /// Upper bound on the serialized size of rows handed to the synthesizer
    #[serde(default = "default_max_result_bytes")]
    pub max_result_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            template_threshold: default_template_threshold(),
            max_question_chars: default_max_question_chars(),
            max_result_bytes: default_max_result_bytes(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_llm_provider() -> String {
    "openai".to_string()
}
fn default_lmstudio_url() -> String {
    "http://localhost:1234".to_string()
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_context_window() -> usize {
    128_000
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> usize {
    1024
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_graph_uri() -> String {
    "bolt://localhost:7687".to_string()
}
fn default_graph_username() -> String {
    "neo4j".to_string()
}
fn default_top_k() -> usize {
    10
}
fn default_template_threshold() -> f32 {
    0.6
}
fn default_max_question_chars() -> usize {
    2000
}
fn default_max_result_bytes() -> usize {
    20_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: EcoGraphConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.ecograph.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Same as [`ConfigManager::load`], but an explicit file replaces the search
    pub fn load_from(explicit_path: Option<&Path>) -> Result<Self> {
        info!("Loading EcoGraph configuration");

        Self::load_dotenv();

        let (config, config_path) = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                (Self::read_toml_file(path)?, Some(path.to_path_buf()))
            }
            None => Self::load_config_file()?,
        };

        let config = Self::apply_env_overrides(config, |key| std::env::var(key).ok());

        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!(config_file = %path.display(), "Configuration loaded"),
            None => info!("Configuration loaded (no config file, using defaults)"),
        }
        info!(
            provider = %config.llm.provider,
            model = ?config.llm.model,
            graph_uri = %config.graph.uri,
            top_k = config.pipeline.top_k,
            "Effective settings"
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Wrap an already-built configuration (tests, embedding callers)
    pub fn from_config(config: EcoGraphConfig) -> Result<Self> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".ecograph.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .ecograph.env: {}", e);
                } else {
                    info!("Loaded .ecograph.env from home directory");
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.ecograph.toml (current directory)
    /// 2. ~/.ecograph/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(EcoGraphConfig, Option<PathBuf>)> {
        let local_config = Path::new(".ecograph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".ecograph").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((EcoGraphConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<EcoGraphConfig> {
        let content = std::fs::read_to_string(path)?;
        let config: EcoGraphConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variable overrides, reading values through `lookup`
    pub fn apply_env_overrides<F>(mut config: EcoGraphConfig, lookup: F) -> EcoGraphConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        // Graph connection
        if let Some(uri) = lookup("NEO4J_URI") {
            config.graph.uri = uri;
        }
        if let Some(username) = lookup("NEO4J_USERNAME") {
            config.graph.username = username;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            config.graph.password = password;
        }
        if let Some(database) = lookup("NEO4J_DATABASE") {
            config.graph.database = Some(database);
        }
        if let Some(live) = lookup("ECOGRAPH_LIVE_SCHEMA") {
            config.graph.live_schema = live.to_lowercase() == "true" || live == "1";
        }

        // LLM configuration
        if let Some(provider) =
            lookup("ECOGRAPH_LLM_PROVIDER").or_else(|| lookup("LLM_PROVIDER"))
        {
            config.llm.provider = provider;
        }
        if let Some(model) = lookup("ECOGRAPH_MODEL") {
            config.llm.model = Some(model);
        }
        if let Some(url) = lookup("ECOGRAPH_OLLAMA_URL") {
            config.llm.ollama_url = url;
        }
        if let Some(url) = lookup("ECOGRAPH_LMSTUDIO_URL") {
            config.llm.lmstudio_url = url;
        }
        if let Some(url) = lookup("ECOGRAPH_OPENAI_COMPATIBLE_URL") {
            config.llm.openai_compatible_url = Some(url);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            config.llm.openai_api_key = Some(key);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            config.llm.anthropic_api_key = Some(key);
        }
        if let Some(context) = lookup("ECOGRAPH_CONTEXT_WINDOW") {
            if let Ok(size) = context.parse() {
                config.llm.context_window = size;
            }
        }
        if let Some(temp) = lookup("ECOGRAPH_TEMPERATURE") {
            if let Ok(t) = temp.parse() {
                config.llm.temperature = t;
            }
        }

        // Pipeline
        if let Some(top_k) = lookup("ECOGRAPH_TOP_K") {
            if let Ok(k) = top_k.parse() {
                config.pipeline.top_k = k;
            }
        }
        if let Some(threshold) = lookup("ECOGRAPH_TEMPLATE_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                config.pipeline.template_threshold = t;
            }
        }

        // Logging
        if let Some(level) = lookup("RUST_LOG") {
            config.logging.level = level;
        }

        config
    }

    /// Validate configuration
    pub fn validate_config(config: &EcoGraphConfig) -> Result<()> {
        let provider = config.llm.provider.to_lowercase();
        if !SUPPORTED_LLM_PROVIDERS.contains(&provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid LLM provider: {}. Must be one of: {}",
                config.llm.provider,
                SUPPORTED_LLM_PROVIDERS.join(", ")
            )));
        }

        // RUST_LOG may carry a directive list; only a bare level is checked
        let level = config.logging.level.to_lowercase();
        if !level.contains('=') && !level.contains(',') {
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {}
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        other
                    )))
                }
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        if config.pipeline.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.top_k must be a positive integer".to_string(),
            ));
        }

        let threshold = config.pipeline.template_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "pipeline.template_threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        if config.pipeline.max_question_chars == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_question_chars must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &EcoGraphConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Write a config file populated with defaults
    pub fn create_default_config(path: &Path) -> Result<()> {
        let config = EcoGraphConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, toml_str)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EcoGraphConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.graph.uri, "bolt://localhost:7687");
        assert_eq!(config.graph.username, "neo4j");
        assert_eq!(config.pipeline.top_k, 10);
        assert!((config.pipeline.template_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.pipeline.max_question_chars, 2000);
        assert_eq!(config.llm.max_retries, 0);
    }

    #[test]
    fn test_config_validation() {
        let config = EcoGraphConfig::default();
        assert!(ConfigManager::validate_config(&config).is_ok());

        let mut bad_provider = config.clone();
        bad_provider.llm.provider = "invalid".to_string();
        assert!(ConfigManager::validate_config(&bad_provider).is_err());

        let mut zero_top_k = config.clone();
        zero_top_k.pipeline.top_k = 0;
        assert!(ConfigManager::validate_config(&zero_top_k).is_err());

        let mut bad_threshold = config.clone();
        bad_threshold.pipeline.template_threshold = 1.5;
        assert!(ConfigManager::validate_config(&bad_threshold).is_err());

        let mut bad_level = config;
        bad_level.logging.level = "loud".to_string();
        assert!(ConfigManager::validate_config(&bad_level).is_err());
    }

    #[test]
    fn test_directive_log_level_is_accepted() {
        let mut config = EcoGraphConfig::default();
        config.logging.level = "ecograph_query=debug,info".to_string();
        assert!(ConfigManager::validate_config(&config).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let lookup = lookup_from(&[
            ("NEO4J_URI", "neo4j+s://demo.databases.neo4j.io"),
            ("NEO4J_PASSWORD", "secret"),
            ("LLM_PROVIDER", "ollama"),
            ("ECOGRAPH_MODEL", "llama3.1:8b"),
            ("ECOGRAPH_TOP_K", "5"),
            ("ECOGRAPH_TEMPLATE_THRESHOLD", "not-a-number"),
        ]);

        let config = ConfigManager::apply_env_overrides(EcoGraphConfig::default(), lookup);
        assert_eq!(config.graph.uri, "neo4j+s://demo.databases.neo4j.io");
        assert_eq!(config.graph.password, "secret");
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model.as_deref(), Some("llama3.1:8b"));
        assert_eq!(config.pipeline.top_k, 5);
        // Unparseable values leave the previous setting untouched
        assert!((config.pipeline.template_threshold - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_provider_env_precedence() {
        let lookup = lookup_from(&[
            ("ECOGRAPH_LLM_PROVIDER", "anthropic"),
            ("LLM_PROVIDER", "ollama"),
        ]);
        let config = ConfigManager::apply_env_overrides(EcoGraphConfig::default(), lookup);
        assert_eq!(config.llm.provider, "anthropic");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EcoGraphConfig = toml::from_str(
            r#"
            [graph]
            uri = "bolt://graph:7687"

            [pipeline]
            top_k = 3
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.graph.uri, "bolt://graph:7687");
        assert_eq!(config.graph.username, "neo4j");
        assert_eq!(config.pipeline.top_k, 3);
        assert_eq!(config.pipeline.max_question_chars, 2000);
        assert_eq!(config.llm.provider, "openai");
    }
}
