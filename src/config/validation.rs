use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::crawler::CompiledRules;
use crate::url::render_page_url;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    CompiledRules::compile(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    render_page_url(&config.page_url_template, 1)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid page-url-template: {}", e)))?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.inter_page_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "inter_page_delay_ms must be >= 100ms, got {}ms",
            config.inter_page_delay_ms
        )));
    }

    if config.ready_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "ready_timeout_secs must be >= 1, got {}",
            config.ready_timeout_secs
        )));
    }

    if config.ready_poll_interval_ms < 50 {
        return Err(ConfigError::Validation(format!(
            "ready_poll_interval_ms must be >= 50ms, got {}ms",
            config.ready_poll_interval_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_path cannot be empty".to_string(),
        ));
    }

    if !config.has_sink() {
        return Err(ConfigError::Validation(
            "at least one of csv_path, json_path or database_path must be set".to_string(),
        ));
    }

    for (name, path) in [
        ("csv_path", &config.csv_path),
        ("json_path", &config.json_path),
        ("database_path", &config.database_path),
    ] {
        if matches!(path, Some(p) if p.is_empty()) {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
