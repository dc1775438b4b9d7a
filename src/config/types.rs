use serde::Deserialize;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub extraction: ExtractionRules,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL of catalog page `n`, with `{page}` standing in for the page number
    #[serde(rename = "page-url-template")]
    pub page_url_template: String,

    /// Maximum number of pages fetched in a single run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Delay between two successful page fetches (milliseconds)
    #[serde(rename = "inter-page-delay-ms", default = "default_inter_page_delay_ms")]
    pub inter_page_delay_ms: u64,

    /// Upper bound on the wait for a page's product listing to appear (seconds)
    #[serde(rename = "ready-timeout-secs", default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,

    /// Pause between readiness polls of the same page (milliseconds)
    #[serde(
        rename = "ready-poll-interval-ms",
        default = "default_ready_poll_interval_ms"
    )]
    pub ready_poll_interval_ms: u64,
}

fn default_max_pages() -> u32 {
    10
}

fn default_inter_page_delay_ms() -> u64 {
    5_000
}

fn default_ready_timeout_secs() -> u64 {
    60
}

fn default_ready_poll_interval_ms() -> u64 {
    1_000
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// CSS selectors locating each record field in a catalog page
///
/// Every selector except `product-container` and `next-page` is evaluated
/// relative to its parent: `brand`, `product-name` and `price-container`
/// inside a product entry, the price and discount selectors inside the
/// price container.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionRules {
    /// One match per product entry; its presence also marks a page as ready
    #[serde(rename = "product-container")]
    pub product_container: String,

    pub brand: String,

    #[serde(rename = "product-name")]
    pub product_name: String,

    #[serde(rename = "price-container")]
    pub price_container: String,

    #[serde(rename = "former-price")]
    pub former_price: String,

    #[serde(rename = "current-price")]
    pub current_price: String,

    pub discount: String,

    /// Link to the following catalog page; must carry an `href` to count
    #[serde(rename = "next-page")]
    pub next_page: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON checkpoint file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,

    /// Path to the append-only CSV file
    #[serde(rename = "csv-path")]
    pub csv_path: Option<String>,

    /// Path to the JSON array document
    #[serde(rename = "json-path")]
    pub json_path: Option<String>,

    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

impl OutputConfig {
    /// Returns true if at least one record sink is configured
    pub fn has_sink(&self) -> bool {
        self.csv_path.is_some() || self.json_path.is_some() || self.database_path.is_some()
    }
}
