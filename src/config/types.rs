use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for Scholar-Scrape
///
/// Every section has built-in defaults matching the Google Scholar listing, so
/// a TOML file only needs the keys it wants to override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
    pub limits: LimitConfig,
}

/// Where and how far to crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Listing endpoint the search query is appended to
    pub base_url: String,

    /// Hosts the collector may visit (exact or "*.example.com")
    pub allowed_domains: Vec<String>,

    /// Maximum number of listing pages to follow
    pub max_pages: u32,

    /// Maximum request depth; 0 disables the check
    pub max_depth: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://scholar.google.com/scholar".to_string(),
            allowed_domains: vec!["scholar.google.com".to_string()],
            max_pages: 100,
            max_depth: 100,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler (omitted from the header when empty)
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ScholarScrape".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: String::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        if self.contact_url.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            )
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the CSV files are written to
    pub directory: String,

    /// Resolve a relative `directory` against the executable's location
    /// instead of the working directory
    pub relative_to_executable: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            relative_to_executable: true,
        }
    }
}

/// CSS selectors locating the parts of a result listing
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    pub result_block: String,
    pub title: String,
    pub snippet: String,
    pub link: String,
    pub authors: String,
    /// Row of action links ("Cited by N", "All N versions")
    pub actions: String,
    pub next_link: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            result_block: ".gs_r".to_string(),
            title: ".gs_rt".to_string(),
            snippet: ".gs_rs".to_string(),
            link: ".gs_rt a".to_string(),
            authors: ".gs_a".to_string(),
            actions: ".gs_fl a".to_string(),
            next_link: "#gs_n td a".to_string(),
        }
    }
}

/// Per-domain limit rule applied by the collector
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LimitConfig {
    /// Glob the rule applies to, e.g. "*scholar.google.com*"
    pub domain_glob: String,

    /// Maximum in-flight requests per matching domain
    pub parallelism: u32,

    /// Delay bounds between requests to the same domain (milliseconds)
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,

    /// Delay bounds used when slow mode is requested (milliseconds)
    pub slow_delay_min_ms: u64,
    pub slow_delay_max_ms: u64,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            domain_glob: "*scholar.google.com*".to_string(),
            parallelism: 1,
            delay_min_ms: 1_000,
            delay_max_ms: 5_000,
            slow_delay_min_ms: 6_000,
            slow_delay_max_ms: 15_000,
        }
    }
}

impl LimitConfig {
    /// Returns the delay bounds for the requested mode
    pub fn delay_range(&self, slow: bool) -> (Duration, Duration) {
        if slow {
            (
                Duration::from_millis(self.slow_delay_min_ms),
                Duration::from_millis(self.slow_delay_max_ms),
            )
        } else {
            (
                Duration::from_millis(self.delay_min_ms),
                Duration::from_millis(self.delay_max_ms),
            )
        }
    }
}

/// Document type filter passed as `as_sdt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentType {
    /// `0,5`
    #[default]
    All,
    /// `0,33`
    Articles,
    /// `1,5`
    CaseLaw,
    /// `0`
    NoPatents,
    /// `2`
    PatentsOnly,
}

impl DocumentType {
    /// The code sent in the query string
    pub fn code(&self) -> &'static str {
        match self {
            Self::All => "0,5",
            Self::Articles => "0,33",
            Self::CaseLaw => "1,5",
            Self::NoPatents => "0",
            Self::PatentsOnly => "2",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DocumentType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0,5" => Ok(Self::All),
            "0,33" => Ok(Self::Articles),
            "1,5" => Ok(Self::CaseLaw),
            "0" => Ok(Self::NoPatents),
            "2" => Ok(Self::PatentsOnly),
            other => Err(ConfigError::Validation(format!(
                "unknown document type '{}' (expected one of 0,5 | 0,33 | 1,5 | 0 | 2)",
                other
            ))),
        }
    }
}

/// The search a single run performs
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Search term, also used as the case-insensitive result filter
    pub term: String,

    /// Interface language (`hl`)
    pub lang: String,

    /// Document type filter (`as_sdt`)
    pub document_type: DocumentType,

    /// Use the longer politeness delay
    pub slow: bool,
}

impl SearchOptions {
    /// Creates options for `term` with the default language and filter
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            lang: "en".to_string(),
            document_type: DocumentType::default(),
            slow: false,
        }
    }
}
