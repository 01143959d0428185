use crate::config::types::{
    Config, LimitConfig, OutputConfig, ScraperConfig, SearchOptions, UserAgentConfig,
};
use crate::extract::Selectors;
use crate::url::{extract_domain, matches_glob};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_limit_config(&config.limits)?;
    validate_limit_scope(&config.scraper, &config.limits)?;
    Selectors::from_config(&config.selectors)?;
    Ok(())
}

/// Validates the per-run search options coming from the command line
pub fn validate_search(search: &SearchOptions) -> Result<(), ConfigError> {
    if search.term.trim().is_empty() {
        return Err(ConfigError::Validation(
            "a search term is required (use --query <TERM>)".to_string(),
        ));
    }

    if search.lang.trim().is_empty() {
        return Err(ConfigError::Validation("lang cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates crawl scope configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-domains must list at least one domain".to_string(),
        ));
    }

    for domain in &config.allowed_domains {
        validate_domain_pattern(domain)?;
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if !config.contact_url.is_empty() {
        Url::parse(&config.contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the domain limit rule
///
/// Parallelism is pinned to 1: cross-page record order relies on one listing
/// page being in flight at a time.
fn validate_limit_config(config: &LimitConfig) -> Result<(), ConfigError> {
    if config.domain_glob.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "domain-glob cannot be empty".to_string(),
        ));
    }

    if config.parallelism != 1 {
        return Err(ConfigError::Validation(format!(
            "parallelism must be 1 to keep pages in order, got {}",
            config.parallelism
        )));
    }

    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay-min-ms ({}) exceeds delay-max-ms ({})",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    if config.slow_delay_min_ms > config.slow_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "slow-delay-min-ms ({}) exceeds slow-delay-max-ms ({})",
            config.slow_delay_min_ms, config.slow_delay_max_ms
        )));
    }

    Ok(())
}

/// Checks that the limit rule covers the base-url host
///
/// A host outside `domain-glob` would be fetched without the configured delay.
fn validate_limit_scope(
    scraper: &ScraperConfig,
    limits: &LimitConfig,
) -> Result<(), ConfigError> {
    let url = Url::parse(&scraper.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
    let host = extract_domain(&url)
        .ok_or_else(|| ConfigError::InvalidUrl("base-url has no host".to_string()))?;

    if !matches_glob(&limits.domain_glob, &host) {
        return Err(ConfigError::Validation(format!(
            "domain-glob '{}' does not match the base-url host '{}'",
            limits.domain_glob, host
        )));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);
    validate_domain_string(domain)
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
