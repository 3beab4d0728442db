//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! building a client from it.

use std::io::Write;

use adpost_domain::{BootstrapFailurePolicy, HalError};
use adpost_infra::{config, AdPostingApiClient};
use tempfile::NamedTempFile;

fn config_file(contents: &str, extension: &str) -> NamedTempFile {
    let mut temp_file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    temp_file
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "base_uri": "https://adposting.example.com/",
        "token_endpoint": "https://auth.example.com/oauth2/token",
        "client_id": "testClientId",
        "client_secret": "testClientSecret",
        "scope": "seek",
        "request_timeout_secs": 15,
        "token_expiry_margin_secs": 45,
        "bootstrap_failure_policy": "retry",
        "user_agent": "adpost-integration/1.0"
    }"#;
    let temp_file = config_file(json_content, "json");

    let config =
        config::load_from_file(Some(temp_file.path().to_path_buf())).expect("json config");

    assert_eq!(config.base_uri, "https://adposting.example.com/");
    assert_eq!(config.token_endpoint, "https://auth.example.com/oauth2/token");
    assert_eq!(config.client_id, "testClientId");
    assert_eq!(config.client_secret, "testClientSecret");
    assert_eq!(config.scope.as_deref(), Some("seek"));
    assert_eq!(config.request_timeout_secs, 15);
    assert_eq!(config.token_expiry_margin_secs, 45);
    assert_eq!(config.bootstrap_failure_policy, BootstrapFailurePolicy::Retry);
    assert_eq!(config.user_agent.as_deref(), Some("adpost-integration/1.0"));
}

#[test]
fn test_load_config_from_toml_file_with_defaults() {
    let toml_content = r#"
base_uri = "https://adposting.example.com/"
token_endpoint = "https://auth.example.com/oauth2/token"
client_id = "testClientId"
client_secret = "testClientSecret"
"#;
    let temp_file = config_file(toml_content, "toml");

    let config =
        config::load_from_file(Some(temp_file.path().to_path_buf())).expect("toml config");

    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.token_expiry_margin_secs, 30);
    assert_eq!(config.bootstrap_failure_policy, BootstrapFailurePolicy::Permanent);
    assert!(config.scope.is_none());
    assert!(config.user_agent.is_none());
}

#[test]
fn test_loaded_config_builds_a_client() {
    let json_content = r#"{
        "base_uri": "https://adposting.example.com/",
        "token_endpoint": "https://auth.example.com/oauth2/token",
        "client_id": "testClientId",
        "client_secret": "testClientSecret"
    }"#;
    let temp_file = config_file(json_content, "json");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf())).expect("config");
    let client = AdPostingApiClient::new(&config).expect("client");

    assert!(!client.is_disposed());
    assert_eq!(client.bootstrap().base_uri().as_str(), "https://adposting.example.com/");
}

#[test]
fn test_load_config_with_zero_timeout_is_rejected() {
    let json_content = r#"{
        "base_uri": "https://adposting.example.com/",
        "token_endpoint": "https://auth.example.com/oauth2/token",
        "client_id": "testClientId",
        "client_secret": "testClientSecret",
        "request_timeout_secs": 0
    }"#;
    let temp_file = config_file(json_content, "json");

    let result = config::load_from_file(Some(temp_file.path().to_path_buf()));
    assert!(matches!(result, Err(HalError::Config(_))), "Should reject a zero timeout");
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/adpost.json".into()));

    match result {
        Err(HalError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let temp_file = config_file(r#"{ "this is": "not valid" "#, "json");

    let result = config::load_from_file(Some(temp_file.path().to_path_buf()));

    match result {
        Err(HalError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}
