use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sources: HashMap<String, SourceConfig>,
    pub api: ApiConfig,
    /// Feed used by the interactive browser: "api" or a key of `sources`.
    pub browse_source: String,
    pub check_interval_seconds: u64,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub log_format: LogFormat,
    pub filters: FilterThresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub default_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    pub base_url: String,
    pub selectors: SelectorTable,
}

/// Ordered extraction rules for every field of one page source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorTable {
    /// Root selector repeated once per listing.
    pub listing: String,
    #[serde(default)]
    pub id: FieldRules,
    pub title: FieldRules,
    pub price: FieldRules,
    pub link: FieldRules,
    pub image: FieldRules,
    pub temperature: FieldRules,
    #[serde(default)]
    pub discount: FieldRules,
    #[serde(default)]
    pub comments: FieldRules,
    #[serde(default)]
    pub date: FieldRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldRules {
    pub rules: Vec<Rule>,
    /// Value reported when no rule matches.
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub locate: Locate,
    pub read: Read,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locate {
    /// The listing element itself.
    Root,
    /// First descendant matching a CSS selector.
    Css(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Read {
    Text,
    Attr(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterThresholds {
    pub discount: f64,
    pub comments: u32,
    pub temperature: f64,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            discount: 50.0,
            comments: 15,
            temperature: 100.0,
        }
    }
}

impl Rule {
    pub fn text(selector: &str) -> Self {
        Self {
            locate: Locate::Css(selector.to_string()),
            read: Read::Text,
        }
    }

    pub fn attr(selector: &str, name: &str) -> Self {
        Self {
            locate: Locate::Css(selector.to_string()),
            read: Read::Attr(name.to_string()),
        }
    }

    pub fn root_attr(name: &str) -> Self {
        Self {
            locate: Locate::Root,
            read: Read::Attr(name.to_string()),
        }
    }
}

impl FieldRules {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules, default: None }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }
}

impl Config {
    /// Built-in defaults, overridden by an optional `deal_monitor.*` file and
    /// `DEAL_MONITOR__*` environment variables.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name("deal_monitor").required(false))
            .add_source(
                config::Environment::with_prefix("DEAL_MONITOR")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to assemble configuration")?;

        settings
            .try_deserialize()
            .context("Invalid deal monitor configuration")
    }

    pub fn source(&self, key: &str) -> Option<&SourceConfig> {
        self.sources.get(key)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut sources = HashMap::new();

        sources.insert(
            "dealabs".to_string(),
            SourceConfig {
                name: "Dealabs".to_string(),
                url: "https://www.dealabs.com/".to_string(),
                base_url: "https://www.dealabs.com".to_string(),
                selectors: pepper_table(),
            },
        );

        // Same platform, the card markup is a redesign or two ahead.
        let mut hotukdeals = pepper_table();
        hotukdeals.title = FieldRules::new(vec![
            Rule::text(".thread-title"),
            Rule::text(".threadCardTitle"),
            Rule::text("h2"),
        ]);
        hotukdeals.link = FieldRules::new(vec![
            Rule::attr("a.thread-link", "href"),
            Rule::attr("a.threadCardTitle", "href"),
            Rule::attr("h2 a", "href"),
        ]);
        sources.insert(
            "hotukdeals".to_string(),
            SourceConfig {
                name: "hotukdeals".to_string(),
                url: "https://www.hotukdeals.com/hot".to_string(),
                base_url: "https://www.hotukdeals.com".to_string(),
                selectors: hotukdeals,
            },
        );

        Config {
            sources,
            api: ApiConfig {
                base_url: "https://lego-api-blue.vercel.app".to_string(),
                default_page_size: 6,
            },
            browse_source: "api".to_string(),
            check_interval_seconds: 300,
            request_timeout_seconds: 25,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            log_format: LogFormat::Text,
            filters: FilterThresholds::default(),
        }
    }
}

/// Thread card table for the Pepper deal-site platform (dealabs and siblings).
fn pepper_table() -> SelectorTable {
    SelectorTable {
        listing: "article.thread".to_string(),
        id: FieldRules::new(vec![
            Rule::root_attr("data-thread-id"),
            Rule::root_attr("id"),
        ]),
        title: FieldRules::new(vec![
            Rule::text("h2"),
            Rule::text(".threadCardTitle"),
            Rule::text(".cept-tt"),
        ]),
        price: FieldRules::new(vec![
            Rule::text(".thread-price"),
            Rule::text(".threadCardPrice"),
            Rule::text(".cept-tp"),
        ])
        .with_default("Price not found"),
        link: FieldRules::new(vec![
            Rule::attr("a.cept-tt", "href"),
            Rule::attr("a.threadCardTitle", "href"),
            Rule::attr("h2 a", "href"),
        ]),
        image: FieldRules::new(vec![
            Rule::attr("img.thread-image", "src"),
            Rule::attr("img.threadCardImage", "src"),
            Rule::attr("img.thread-image", "data-src"),
            Rule::attr("img.threadCardImage", "data-src"),
            Rule::attr("img.cept-thread-img", "src"),
        ]),
        temperature: FieldRules::new(vec![
            Rule::text(".cept-vote-temp"),
            Rule::text(".vote-box--count"),
            Rule::text(".threadCardDealVoteCount"),
        ])
        .with_default("0"),
        discount: FieldRules::new(vec![
            Rule::text(".thread-discount"),
            Rule::text(".cept-discount"),
        ])
        .with_default("0"),
        comments: FieldRules::new(vec![
            Rule::text(".cept-comment-link"),
            Rule::text("a[href$='#comments']"),
        ])
        .with_default("0"),
        date: FieldRules::new(vec![
            Rule::attr("time", "datetime"),
            Rule::attr("[data-timestamp]", "data-timestamp"),
        ]),
    }
}
