use legal_research_chat::config::AppConfig;
use serial_test::serial;
use std::env;
use std::fs;

const BIN: &str = "legal-research-chat";

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("LRC_SERVER__PORT");
        env::remove_var("LRC_RESEARCH__BASE_URL");
        env::remove_var("LRC_RESEARCH__MEMO_PATH");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("RESEARCH_API_URL");
        env::remove_var("DOC_BASE_URL");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args([BIN]).expect("defaults should load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.session_timeout_secs, 30 * 60);
    assert_eq!(config.research.base_url, "http://127.0.0.1:8000/");
    assert_eq!(config.research.doc_base_url, "https://indiankanoon.org");
    assert_eq!(config.research.search_path, "api/legal/research/");
    assert_eq!(config.research.memo_path, "legal/research/");
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("LRC_SERVER__PORT", "9090");
        env::set_var("LRC_RESEARCH__MEMO_PATH", "v2/memo/");
        env::set_var("DOC_BASE_URL", "https://docs.example.test");
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.research.memo_path, "v2/memo/");
    assert_eq!(config.research.doc_base_url, "https://docs.example.test");

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("LRC_SERVER__PORT", "9090");
        env::set_var("LRC_RESEARCH__BASE_URL", "http://env.example.test/");
    }

    let config = AppConfig::load_from_args([
        BIN,
        "--port",
        "4000",
        "--research-url",
        "http://cli.example.test/",
    ])
    .expect("Failed to load config");
    assert_eq!(config.server.port, 4000);
    assert_eq!(config.research.base_url, "http://cli.example.test/");

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("temp dir");
    let file_path = dir.path().join("research.yaml");
    fs::write(
        &file_path,
        r#"
server:
  port: 7070
research:
  base_url: "http://research.internal:9000/"
"#,
    )
    .expect("Failed to write temp config");

    // Tell AppConfig to use this file via Env Var
    unsafe {
        env::set_var("CONFIG_FILE", &file_path);
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.research.base_url, "http://research.internal:9000/");
    assert_eq!(config.research.memo_path, "legal/research/");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_named_file_is_an_error() {
    clear_env_vars();

    let result = AppConfig::load_from_args([BIN, "--config", "/nonexistent/research.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cwd_config_fallback() {
    clear_env_vars();

    let cwd_path = "config.yaml";
    fs::write(
        cwd_path,
        r#"
server:
  port: 6060
"#,
    )
    .expect("Failed to write ./config.yaml");

    let config = AppConfig::load_from_args([BIN]);

    fs::remove_file(cwd_path).unwrap();

    assert_eq!(config.expect("Failed to load config").server.port, 6060);
}
