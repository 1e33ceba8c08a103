use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use tracing::{error, info, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::error::DealError;
use crate::extract::ListingExtractor;
use crate::models::{Deal, DealPage, PageQuery, PaginationMeta};
use crate::normalize::{disambiguate_ids, normalize};
use crate::scrapers::DealFeed;
use crate::utils::http::fetch_html;

/// Table-driven scraper for one HTML page source.
pub struct HtmlScraper {
    config: SourceConfig,
    extractor: ListingExtractor,
}

/// Outcome of one scrape. `failure` set means "no data this cycle" and
/// `deals` is empty.
#[derive(Debug)]
pub struct ScrapeReport {
    pub deals: Vec<Deal>,
    pub failure: Option<DealError>,
}

impl ScrapeReport {
    pub fn ok(&self) -> bool {
        self.failure.is_none()
    }
}

impl HtmlScraper {
    pub fn new(key: &str, config: &SourceConfig) -> Result<Self, DealError> {
        Ok(Self {
            config: config.clone(),
            extractor: ListingExtractor::new(key, config)?,
        })
    }

    pub fn site_config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn extractor(&self) -> &ListingExtractor {
        &self.extractor
    }

    /// Fetch `url` and turn every listing element on it into a deal.
    pub async fn scrape(&self, client: &Client, url: &str) -> ScrapeReport {
        info!("Scraping {}...", self.config.name);

        let result = match fetch_html(client, url, Some(&self.config.base_url)).await {
            Ok(html) => self.scrape_document(&html, url, Utc::now()),
            Err(e) => Err(e),
        };

        match result {
            Ok(deals) => ScrapeReport {
                deals,
                failure: None,
            },
            Err(e) => {
                error!("Error scraping {}: {}", self.config.name, e);
                ScrapeReport {
                    deals: Vec::new(),
                    failure: Some(e),
                }
            }
        }
    }

    /// Extraction half of [`scrape`](Self::scrape), kept synchronous so the
    /// parsed document never lives across an await point.
    pub fn scrape_document(
        &self,
        html: &str,
        url: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<Vec<Deal>, DealError> {
        let document = Html::parse_document(html);
        let outcomes: Vec<_> = document
            .select(self.extractor.listing_selector())
            .map(|element| self.extractor.extract_listing(element, scraped_at))
            .collect();

        info!("Found {} listing elements on {} page", outcomes.len(), self.config.name);

        if outcomes.is_empty() {
            return Err(DealError::NoListings {
                url: url.to_string(),
                selector: self.extractor.listing_css().to_string(),
            });
        }

        let mut partial = 0;
        let mut deals: Vec<Deal> = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| {
                if !outcome.issues().is_empty() {
                    partial += 1;
                }
                for issue in outcome.issues() {
                    warn!("{} listing #{}: {}", self.config.name, index + 1, issue.error);
                }
                normalize(&outcome.into_record())
            })
            .collect();

        if partial > 0 {
            info!("{} of {} {} listings used defaults", partial, deals.len(), self.config.name);
        }

        disambiguate_ids(&mut deals);
        Ok(deals)
    }
}

// Upper bound on source pages fetched to fill one view page.
const MAX_SOURCE_PAGES: u32 = 10;

#[async_trait]
impl DealFeed for HtmlScraper {
    /// Source pages and view pages differ in size, so listings are gathered
    /// from source page 1 onwards until the requested window is covered.
    async fn fetch_page(&self, client: &Client, query: PageQuery) -> Result<DealPage, DealError> {
        let wanted = query.page as usize * query.size as usize;
        let mut listings: Vec<Deal> = Vec::new();
        let mut seen = HashSet::new();
        let mut exhausted = false;

        for source_page in 1..=MAX_SOURCE_PAGES {
            if listings.len() > wanted {
                break;
            }

            let report = self
                .scrape(client, &page_url(&self.config.url, source_page))
                .await;
            match report.failure {
                None => {}
                Some(DealError::NoListings { .. }) if source_page > 1 => {
                    exhausted = true;
                    break;
                }
                Some(e) => return Err(e),
            }

            let before = listings.len();
            listings.extend(
                report
                    .deals
                    .into_iter()
                    .filter(|deal| seen.insert(deal.id.clone())),
            );

            // A source ignoring the page parameter serves the same listings again.
            if listings.len() == before {
                exhausted = true;
                break;
            }
        }

        Ok(window(listings, query, exhausted))
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

/// Cut view page `query.page` out of the listings gathered so far. `count` is
/// the number of listings known; once the source is exhausted the page count
/// is exact and an out-of-range page falls back to the last one.
fn window(listings: Vec<Deal>, query: PageQuery, exhausted: bool) -> DealPage {
    let size = (query.size as usize).max(1);
    let total = listings.len();
    let known_pages = ((total + size - 1) / size).max(1) as u32;
    let page_count = if exhausted {
        known_pages
    } else {
        known_pages.max(query.page + 1)
    };

    let page = query.page.clamp(1, page_count);
    let start = ((page - 1) as usize * size).min(total);
    let deals = listings.into_iter().skip(start).take(size).collect();

    DealPage {
        deals,
        meta: PaginationMeta::new(page, page_count, total),
    }
}

/// `url` with its `page` query parameter set; page 1 is the bare URL.
pub fn page_url(url: &str, page: u32) -> String {
    if page <= 1 {
        return url.to_string();
    }

    match Url::parse(url) {
        Ok(mut parsed) => {
            let kept: Vec<(String, String)> = parsed
                .query_pairs()
                .filter(|(key, _)| key != "page")
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .append_pair("page", &page.to_string());
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
