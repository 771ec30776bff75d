use crate::config::types::{
    Config, OutputConfig, PaginationConfig, ScraperConfig, VocabularyConfig, KANJI_PLACEHOLDER,
};
use crate::vocab::KnownCharacters;
use crate::ConfigError;

/// Character used to check that the URL template resolves
const SAMPLE_TARGET: char = '人';

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_pagination_config(&config.pagination)?;
    validate_vocabulary_config(&config.vocabulary)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site and HTTP settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if !config.base_url.contains(KANJI_PLACEHOLDER) {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must contain the {} placeholder, got '{}'",
            KANJI_PLACEHOLDER, config.base_url
        )));
    }

    config.search_url(SAMPLE_TARGET)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    validate_timeout("request_timeout_secs", config.request_timeout_secs)?;
    validate_timeout("connect_timeout_secs", config.connect_timeout_secs)?;

    Ok(())
}

fn validate_timeout(name: &str, secs: u64) -> Result<(), ConfigError> {
    if !(1..=120).contains(&secs) {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and 120, got {}",
            name, secs
        )));
    }
    Ok(())
}

/// Validates pagination settings
fn validate_pagination_config(config: &PaginationConfig) -> Result<(), ConfigError> {
    if !(1..=100).contains(&config.page_budget) {
        return Err(ConfigError::Validation(format!(
            "page_budget must be between 1 and 100, got {}",
            config.page_budget
        )));
    }

    if !(1..=50).contains(&config.concurrency) {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 50, got {}",
            config.concurrency
        )));
    }

    if !(1..=10).contains(&config.max_attempts) {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.base_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "base_delay_ms must be <= 60000ms, got {}ms",
            config.base_delay_ms
        )));
    }

    Ok(())
}

/// Validates the known-character list
fn validate_vocabulary_config(config: &VocabularyConfig) -> Result<(), ConfigError> {
    KnownCharacters::parse(&config.known_characters, config.allow_kana)?;
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let paths = [
        ("summary_path", &config.summary_path),
        ("export_path", &config.export_path),
    ];

    for (name, path) in paths {
        if let Some(path) = path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }
    }

    Ok(())
}
