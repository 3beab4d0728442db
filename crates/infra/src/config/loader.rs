//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ADPOST_BASE_URI`: API root URI (required)
//! - `ADPOST_TOKEN_ENDPOINT`: OAuth2 token endpoint (required)
//! - `ADPOST_CLIENT_ID`: OAuth2 client id (required)
//! - `ADPOST_CLIENT_SECRET`: OAuth2 client secret (required)
//! - `ADPOST_SCOPE`: OAuth2 scope
//! - `ADPOST_REQUEST_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `ADPOST_TOKEN_EXPIRY_MARGIN_SECS`: Seconds before expiry a token is
//!   refreshed
//! - `ADPOST_BOOTSTRAP_RETRY`: Retry a failed root load (true/false)
//! - `ADPOST_USER_AGENT`: User-Agent header override
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./adpost.json` or `./adpost.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable
//!
//! A file may leave `client_secret` out; it is then read from
//! `ADPOST_CLIENT_SECRET`.

use std::path::{Path, PathBuf};

use adpost_domain::{BootstrapFailurePolicy, ClientConfig, HalError, Result};

const BASE_URI: &str = "ADPOST_BASE_URI";
const TOKEN_ENDPOINT: &str = "ADPOST_TOKEN_ENDPOINT";
const CLIENT_ID: &str = "ADPOST_CLIENT_ID";
const CLIENT_SECRET: &str = "ADPOST_CLIENT_SECRET";
const SCOPE: &str = "ADPOST_SCOPE";
const REQUEST_TIMEOUT_SECS: &str = "ADPOST_REQUEST_TIMEOUT_SECS";
const TOKEN_EXPIRY_MARGIN_SECS: &str = "ADPOST_TOKEN_EXPIRY_MARGIN_SECS";
const BOOTSTRAP_RETRY: &str = "ADPOST_BOOTSTRAP_RETRY";
const USER_AGENT: &str = "ADPOST_USER_AGENT";

const CONFIG_FILE_NAMES: [&str; 4] = ["adpost.json", "adpost.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `HalError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `HalError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(
        env_var(BASE_URI)?,
        env_var(TOKEN_ENDPOINT)?,
        env_var(CLIENT_ID)?,
        env_var(CLIENT_SECRET)?,
    );

    if let Some(secs) = env_u64(REQUEST_TIMEOUT_SECS)? {
        config = config.with_request_timeout_secs(secs);
    }
    if let Some(secs) = env_u64(TOKEN_EXPIRY_MARGIN_SECS)? {
        config = config.with_token_expiry_margin_secs(secs);
    }
    if env_bool(BOOTSTRAP_RETRY, false) {
        config = config.with_bootstrap_failure_policy(BootstrapFailurePolicy::Retry);
    }
    if let Some(scope) = env_opt(SCOPE) {
        config = config.with_scope(scope);
    }
    if let Some(agent) = env_opt(USER_AGENT) {
        config = config.with_user_agent(agent);
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations (see
/// [`probe_config_paths`]). Format is detected by file extension.
///
/// # Errors
/// Returns `HalError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HalError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HalError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HalError::Config(format!("Failed to read config file: {}", e)))?;

    let mut config = parse_config(&contents, &config_path)?;
    if config.client_secret.is_empty() {
        if let Some(secret) = env_opt(CLIENT_SECRET) {
            config.client_secret = secret;
        }
    }

    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// # Errors
/// Returns `HalError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| HalError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| HalError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(HalError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe standard paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `HalError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| HalError::Config(format!("Missing required environment variable: {}", key)))
}

/// Optional environment variable; blank values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    env_opt(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| HalError::Config(format!("Invalid {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
