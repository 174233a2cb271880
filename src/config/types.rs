use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the crawler
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

/// Selects how strict extraction is, whether per-URL failures are fatal,
/// and which output format the crawl produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyVariant {
    /// Item pages only, all three item fields required, fetch and parse
    /// failures abort the crawl, records go to standard output
    Minimal,

    /// Every visited page yields a record, failures are per URL, records go
    /// to a JSON-lines file
    #[default]
    Extended,
}

impl PolicyVariant {
    /// Returns true if a fetch or parse failure terminates the whole crawl
    pub fn failures_are_fatal(&self) -> bool {
        matches!(self, Self::Minimal)
    }

    /// Returns true if pages classified as `Other` are followed
    pub fn follows_other_pages(&self) -> bool {
        matches!(self, Self::Extended)
    }

    /// The output format records are written in after the crawl
    pub fn output_format(&self) -> OutputFormat {
        match self {
            Self::Minimal => OutputFormat::Console,
            Self::Extended => OutputFormat::JsonLines,
        }
    }
}

impl std::str::FromStr for PolicyVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" | "a" => Ok(Self::Minimal),
            "extended" | "b" => Ok(Self::Extended),
            other => Err(format!("unknown policy '{}'", other)),
        }
    }
}

/// Output formats the crawler can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Records and a labeled summary printed to standard output
    Console,
    /// One JSON object per line in the configured output file
    JsonLines,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// First URL placed in the frontier; also the base for resolving links
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Prefix every enqueued and visited URL must start with
    #[serde(rename = "site-scope")]
    pub site_scope: String,

    /// Regular expression, anchored at the start of the URL, marking item pages
    #[serde(rename = "item-pattern")]
    pub item_pattern: String,

    /// Optional regular expression marking additional listing pages
    #[serde(rename = "listing-pattern")]
    pub listing_pattern: Option<String>,

    /// Maximum number of pages visited in one run
    #[serde(rename = "max-visits")]
    pub max_visits: u32,

    /// Pause after each visit, per worker (milliseconds)
    #[serde(rename = "politeness-delay")]
    pub politeness_delay_ms: u64,

    /// Number of workers dequeuing concurrently
    pub workers: u32,

    pub policy: PolicyVariant,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: "https://web-scraping.dev/products".to_string(),
            site_scope: "https://web-scraping.dev/".to_string(),
            item_pattern: r"https://web-scraping\.dev/product/\d+".to_string(),
            listing_pattern: None,
            max_visits: 20,
            politeness_delay_ms: 500,
            workers: 1,
            policy: PolicyVariant::default(),
        }
    }
}

impl CrawlerConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

/// How non-2xx responses are treated by the fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusPolicy {
    /// A non-2xx status counts as a failed attempt and is retried
    #[default]
    Retry,
    /// Any response body is accepted regardless of status
    Accept,
}

/// Fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total attempts per URL before giving up
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay between attempts (milliseconds)
    #[serde(rename = "retry-delay")]
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,

    #[serde(rename = "status-policy")]
    pub status_policy: StatusPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay_ms: 2000,
            timeout_secs: 30,
            status_policy: StatusPolicy::default(),
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "catalog-crawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} ({})",
            self.crawler_name, self.crawler_version, self.contact_email
        )
    }
}

/// CSS selectors used by the extractor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Page title (extended policy)
    #[serde(rename = "title-selector")]
    pub title_selector: String,

    /// Page description (extended policy)
    #[serde(rename = "description-selector")]
    pub description_selector: String,

    /// Rows of the feature table (extended policy)
    #[serde(rename = "feature-row-selector")]
    pub feature_row_selector: String,

    /// Cells within a feature row
    #[serde(rename = "feature-cell-selector")]
    pub feature_cell_selector: String,

    /// Item name heading (minimal policy)
    #[serde(rename = "item-name-selector")]
    pub item_name_selector: String,

    /// Item short description block (minimal policy)
    #[serde(rename = "item-paragraph-selector")]
    pub item_paragraph_selector: String,

    /// Item thumbnail image (minimal policy)
    #[serde(rename = "item-image-selector")]
    pub item_image_selector: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            title_selector: "h1".to_string(),
            description_selector: ".product-description".to_string(),
            feature_row_selector: ".product-features tr".to_string(),
            feature_cell_selector: "th, td".to_string(),
            item_name_selector: "h1.product-title".to_string(),
            item_paragraph_selector: "div.woocommerce-product-details__short-description"
                .to_string(),
            item_image_selector: "img.attachment-woocommerce_thumbnail".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON-lines file (extended policy)
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./records.jsonl".to_string(),
        }
    }
}
