use crate::config::types::{Config, CrawlerConfig, ExtractConfig, FetchConfig, UserAgentConfig};
use crate::url::{normalize_scope, normalize_url};
use crate::{ConfigError, UrlError};
use regex::Regex;
use scraper::Selector;

/// Upper bound on the worker pool size
const MAX_WORKERS: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_extract_config(&config.extract)?;

    if config.output.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = normalize_url(&config.seed_url).map_err(|e| match e {
        UrlError::InvalidScheme(_) => ConfigError::Validation(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            config.seed_url
        )),
        other => ConfigError::InvalidUrl(format!(
            "Invalid seed URL '{}': {}",
            config.seed_url, other
        )),
    })?;

    let scope = normalize_scope(&config.site_scope).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid site scope '{}': {}", config.site_scope, e))
    })?;

    // Compared in normalized form, as the crawl compares them
    if !seed.as_str().starts_with(&scope) {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' is outside the site scope '{}'",
            config.seed_url, config.site_scope
        )));
    }

    validate_pattern(&config.item_pattern)?;
    if let Some(pattern) = &config.listing_pattern {
        validate_pattern(pattern)?;
    }

    if config.max_visits < 1 {
        return Err(ConfigError::Validation(format!(
            "max_visits must be >= 1, got {}",
            config.max_visits
        )));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {}s",
            config.timeout_secs
        )));
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

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates every extraction selector
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.title_selector,
        &config.description_selector,
        &config.feature_row_selector,
        &config.feature_cell_selector,
        &config.item_name_selector,
        &config.item_paragraph_selector,
        &config.item_image_selector,
    ] {
        Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;
    }
    Ok(())
}

fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "URL pattern cannot be empty".to_string(),
        ));
    }

    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_seed_outside_scope() {
        let mut config = Config::default();
        config.crawler.seed_url = "https://other.example.com/".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_mixed_case_host_compared_normalized() {
        let mut config = Config::default();
        config.crawler.seed_url = "https://Shop.example.com/products".to_string();
        config.crawler.site_scope = "https://Shop.example.com/".to_string();
        assert!(validate(&config).is_ok());

        config.crawler.site_scope = "https://shop.EXAMPLE.com/products".to_string();
        assert!(validate(&config).is_ok());

        config.crawler.site_scope = "https://shop.example.com/catalog/".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_seed_must_be_http() {
        let mut config = Config::default();
        config.crawler.seed_url = "ftp://web-scraping.dev/products".to_string();
        config.crawler.site_scope = "ftp://web-scraping.dev/".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_seed_url() {
        let mut config = Config::default();
        config.crawler.seed_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_item_pattern() {
        let mut config = Config::default();
        config.crawler.item_pattern = r"https://(unclosed".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_invalid_listing_pattern() {
        let mut config = Config::default();
        config.crawler.listing_pattern = Some(String::new());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_worker_bounds() {
        let mut config = Config::default();
        config.crawler.workers = 0;
        assert!(validate(&config).is_err());
        config.crawler.workers = MAX_WORKERS + 1;
        assert!(validate(&config).is_err());
        config.crawler.workers = 4;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = Config::default();
        config.fetch.max_retries = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_selector() {
        let mut config = Config::default();
        config.extract.title_selector = "h1[".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_crawler_name_characters() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "bad name".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }
}
