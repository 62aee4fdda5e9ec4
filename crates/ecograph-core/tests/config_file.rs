// ABOUTME: Integration tests for file-based configuration loading.
// ABOUTME: Exercises explicit paths, default file generation and env precedence.

use ecograph_core::{ConfigError, ConfigManager, EcoGraphConfig};
use serial_test::serial;
use std::io::Write;

const ENV_KEYS: &[&str] = &[
    "NEO4J_URI",
    "NEO4J_USERNAME",
    "NEO4J_PASSWORD",
    "NEO4J_DATABASE",
    "ECOGRAPH_LLM_PROVIDER",
    "LLM_PROVIDER",
    "ECOGRAPH_MODEL",
    "ECOGRAPH_TOP_K",
    "ECOGRAPH_TEMPLATE_THRESHOLD",
    "RUST_LOG",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_load_explicit_file() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
[llm]
provider = "ollama"
model = "llama3.1:8b"

[graph]
uri = "bolt://economy-graph:7687"
password = "from-file"

[pipeline]
top_k = 7
"#
    )
    .expect("write config");

    let manager = ConfigManager::load_from(Some(file.path())).expect("config loads");
    let config = manager.config();
    assert_eq!(config.llm.provider, "ollama");
    assert_eq!(config.graph.uri, "bolt://economy-graph:7687");
    assert_eq!(config.graph.password, "from-file");
    assert_eq!(config.pipeline.top_k, 7);
    assert_eq!(manager.config_path(), Some(file.path()));
}

#[test]
#[serial]
fn test_env_beats_file() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[pipeline]\ntop_k = 7\n").expect("write config");

    std::env::set_var("ECOGRAPH_TOP_K", "2");
    let manager = ConfigManager::load_from(Some(file.path())).expect("config loads");
    std::env::remove_var("ECOGRAPH_TOP_K");

    assert_eq!(manager.config().pipeline.top_k, 2);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_reported() {
    clear_env();
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("nope.toml");

    match ConfigManager::load_from(Some(&missing)) {
        Err(ConfigError::NotFound(path)) => assert!(path.ends_with("nope.toml")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("missing file should not load"),
    }
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[pipeline]\ntop_k = 0\n").expect("write config");

    let result = ConfigManager::load_from(Some(file.path()));
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_create_default_config_round_trips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("config.toml");

    ConfigManager::create_default_config(&path).expect("default config written");

    let content = std::fs::read_to_string(&path).expect("config readable");
    let parsed: EcoGraphConfig = toml::from_str(&content).expect("config parses");
    assert_eq!(parsed.pipeline.top_k, EcoGraphConfig::default().pipeline.top_k);
    assert_eq!(parsed.graph.uri, EcoGraphConfig::default().graph.uri);
}
