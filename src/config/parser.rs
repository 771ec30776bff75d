use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and validates a configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use kanji_vocab::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Page budget: {}", config.pagination.page_budget);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;

    tracing::debug!(
        "Loaded config: {} strategy, budget {}",
        config.pagination.strategy,
        config.pagination.page_budget
    );

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is printed in the run summary so an export can be traced back
/// to the configuration that produced it.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads a configuration together with the hash of the exact text parsed
///
/// The file is read once, so the hash always matches the returned config.
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}
