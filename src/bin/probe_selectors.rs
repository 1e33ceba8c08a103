use anyhow::{Context, Result};
use chrono::Utc;
use scraper::Html;
use std::fs;

use deal_monitor::config::Config;
use deal_monitor::scrapers::HtmlScraper;
use deal_monitor::utils::http::{create_client, fetch_html};

/// Fetch one configured source and report how its selector table fares
/// against the live markup.
#[tokio::main]
async fn main() -> Result<()> {
    let key = std::env::args().nth(1).unwrap_or_else(|| "dealabs".to_string());

    let config = Config::load()?;
    let source = config
        .source(&key)
        .with_context(|| format!("Unknown source '{}'", key))?;
    let scraper = HtmlScraper::new(&key, source)?;
    let extractor = scraper.extractor();

    let client = create_client(&config)?;

    println!("Fetching {} HTML...", source.name);
    let html = fetch_html(&client, &source.url, Some(&source.base_url)).await?;
    let sample = format!("{}_sample.html", key);
    fs::write(&sample, &html)?;
    println!("Saved page to {}", sample);

    let document = Html::parse_document(&html);
    let listings: Vec<_> = document.select(extractor.listing_selector()).collect();
    println!(
        "Selector '{}' matched {} listing elements",
        extractor.listing_css(),
        listings.len()
    );

    let Some(first) = listings.first() else {
        return Ok(());
    };

    println!("\nRule hits inside the first listing:");
    for field in extractor.fields() {
        let counts = field.match_counts(*first);
        let hits: Vec<String> = counts
            .iter()
            .enumerate()
            .map(|(index, count)| format!("#{}={}", index + 1, count))
            .collect();
        println!("  {:<12} {}", field.field().key(), hits.join(" "));
    }

    let outcome = extractor.extract_listing(*first, Utc::now());
    println!("\nFirst listing as extracted:\n{:#?}", outcome.record());
    for issue in outcome.issues() {
        println!("  issue: {}", issue.error);
    }

    match scraper.scrape_document(&html, &source.url, Utc::now()) {
        Ok(deals) => println!("\n{} deals normalized", deals.len()),
        Err(e) => println!("\nExtraction failed: {}", e),
    }

    Ok(())
}
