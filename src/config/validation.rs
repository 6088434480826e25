use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, QueueBackendKind, QueueConfig, RobotsConfig,
    UserAgentConfig, WorkerConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_robots_config(&config.robots)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_queue_config(&config.queue)?;
    validate_worker_config(&config.workers)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout < 1 || config.request_timeout > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be between 1 and 300 seconds, got {}",
            config.request_timeout
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.media_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "media_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates robots.txt configuration
fn validate_robots_config(config: &RobotsConfig) -> Result<(), ConfigError> {
    if config.timeout < 1 || config.timeout > 300 {
        return Err(ConfigError::Validation(format!(
            "robots timeout must be between 1 and 300 seconds, got {}",
            config.timeout
        )));
    }

    if config.user_agent_token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent_token cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
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

/// Validates queue configuration
fn validate_queue_config(config: &QueueConfig) -> Result<(), ConfigError> {
    if config.queue_name.is_empty() {
        return Err(ConfigError::Validation(
            "queue_name cannot be empty".to_string(),
        ));
    }

    if !config
        .queue_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "queue_name must contain only ASCII letters, digits and underscores, got '{}'",
            config.queue_name
        )));
    }

    match config.backend {
        QueueBackendKind::Sqlite => {
            if config.database_path.is_empty() {
                return Err(ConfigError::Validation(
                    "queue database_path cannot be empty".to_string(),
                ));
            }
        }
        QueueBackendKind::Redis => {
            let url = Url::parse(&config.redis_url)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid redis_url: {}", e)))?;
            if url.scheme() != "redis" && url.scheme() != "rediss" {
                return Err(ConfigError::InvalidUrl(format!(
                    "redis_url must use the redis:// or rediss:// scheme, got '{}'",
                    config.redis_url
                )));
            }
        }
    }

    Ok(())
}

/// Validates worker pool configuration
fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    if config.count < 1 || config.count > 100 {
        return Err(ConfigError::Validation(format!(
            "worker count must be between 1 and 100, got {}",
            config.count
        )));
    }

    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
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

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
