//! Configuration loading from disk and environment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Deployment environment file read from the working directory.
pub const DOTENV_FILE: &str = ".env";

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides (process environment, then `.env`), and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    load_config_with_dotenv(path, Path::new(DOTENV_FILE))
}

/// [`load_config`] with an explicit `.env` location. A missing file is ignored.
pub fn load_config_with_dotenv(
    path: Option<&Path>,
    dotenv_path: &Path,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    let dotenv = read_dotenv(dotenv_path)?;
    if !dotenv.is_empty() {
        tracing::debug!(path = ?dotenv_path, variables = dotenv.len(), "Loaded .env file");
    }
    // Variables already in the process environment win over the file.
    apply_env_overrides(&mut config, |key| {
        std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
    });
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Override file values with the deployment's environment variables.
///
/// `lookup` resolves a variable name to its value, if set.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("TRANSFERHOST").filter(|v| !v.is_empty()) {
        config.proxy.target_host = host;
    }
    if let Some(debug) = lookup("PROXYDEBUG") {
        config.proxy.debug = debug == "1";
    }
    if let Some(path) = lookup("PROXYPATH").filter(|v| !v.is_empty()) {
        config.proxy.mount_path = path;
    }
    if let Some(verify) = lookup("SSL_VERIFY_PEER") {
        config.upstream.ssl_verify_peer = parse_bool(&verify);
    }
    if let Some(verify) = lookup("SSL_VERIFY_HOST") {
        config.upstream.ssl_verify_host = parse_bool(&verify);
    }
    if let Some(dir) = lookup("WSDL_CACHE_DIR").filter(|v| !v.is_empty()) {
        config.cache.directory = PathBuf::from(dir);
    }
}

/// Parse a `.env` file into a map without touching the process environment.
fn read_dotenv(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    match dotenvy::from_path_iter(path) {
        Ok(entries) => Ok(entries.collect::<Result<_, _>>()?),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(e.into()),
    }
}

/// `1/true/on/yes` are true, anything else is false.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}
