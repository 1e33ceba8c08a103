use async_trait::async_trait;
use reqwest::Client;

use crate::config::Config;
use crate::error::DealError;
use crate::models::{DealPage, PageQuery};

mod api;
mod html;

pub use api::{parse_api_response, ApiDeal, ApiFeed};
pub use html::{page_url, HtmlScraper, ScrapeReport};

/// A paginated source of deals. A failed fetch is an `Err`; callers keep
/// whatever they showed before.
#[async_trait]
pub trait DealFeed: Send + Sync {
    async fn fetch_page(&self, client: &Client, query: PageQuery) -> Result<DealPage, DealError>;
    fn name(&self) -> &str;
}

/// Build the feed named by `key`: "api" or one of the configured HTML sources.
pub fn feed_for(config: &Config, key: &str) -> anyhow::Result<Box<dyn DealFeed>> {
    if key == "api" {
        return Ok(Box::new(ApiFeed::new(&config.api.base_url)));
    }

    let source = config
        .source(key)
        .ok_or_else(|| anyhow::anyhow!("Unknown deal source '{}'", key))?;
    Ok(Box::new(HtmlScraper::new(key, source)?))
}
