use crate::config::types::{Config, CrawlerConfig, OutputConfig, RoutesConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_paths(config)?;
    validate_routes(&config.routes)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_domains < 1 || config.max_concurrent_domains > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_domains must be between 1 and 64, got {}",
            config.max_concurrent_domains
        )));
    }

    if config.default_scheme != "http" && config.default_scheme != "https" {
        return Err(ConfigError::Validation(format!(
            "default_scheme must be 'http' or 'https', got '{}'",
            config.default_scheme
        )));
    }

    if config.page_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "page_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.domain_timeout_secs < config.page_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "domain_timeout_secs ({}) must be >= page_timeout_secs ({})",
            config.domain_timeout_secs, config.page_timeout_secs
        )));
    }

    if config.max_pages_per_domain < 1 {
        return Err(ConfigError::Validation(
            "max_pages_per_domain must be >= 1".to_string(),
        ));
    }

    if config.max_probe_attempts < 1 {
        return Err(ConfigError::Validation(
            "max_probe_attempts must be >= 1".to_string(),
        ));
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

/// Validates the input and output paths
fn validate_paths(config: &Config) -> Result<(), ConfigError> {
    if config.input.roster_path.is_empty() {
        return Err(ConfigError::Validation(
            "roster_path cannot be empty".to_string(),
        ));
    }

    let OutputConfig { dataset_path } = &config.output;
    if dataset_path.is_empty() {
        return Err(ConfigError::Validation(
            "dataset_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Keyword overrides must not be empty lists or contain blank entries
fn validate_routes(routes: &RoutesConfig) -> Result<(), ConfigError> {
    for (name, keywords) in [
        ("deny_keywords", &routes.deny_keywords),
        ("allow_keywords", &routes.allow_keywords),
    ] {
        let Some(keywords) = keywords else {
            continue;
        };

        if keywords.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} cannot be an empty list; omit it to use the built-in set",
                name
            )));
        }

        if keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot contain blank keywords",
                name
            )));
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
