use anyhow::Result;
use chrono::Local;
use futures::future::join_all;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::interval;
use tracing::{error, info};

use deal_monitor::config::{Config, LogFormat};
use deal_monitor::render::{ConsolePresenter, Presenter};
use deal_monitor::scrapers::{feed_for, HtmlScraper};
use deal_monitor::utils::http::create_client;
use deal_monitor::{Browser, Command, DealStore, PaginationMeta, QueryEngine, ViewMode};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(config.log_format)?;

    info!("Starting Deal Monitor");

    // Initialize HTTP client with connection pooling
    let client = create_client(&config)?;

    match std::env::args().nth(1).as_deref() {
        None | Some("browse") => browse(&config, client).await,
        Some("watch") => watch(&config, client).await,
        Some(other) => anyhow::bail!("Unknown command '{}', expected 'browse' or 'watch'", other),
    }
}

// Logs go to stderr so the rendered deals on stdout stay readable.
fn init_logging(format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("deal_monitor=info".parse()?);

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    Ok(())
}

/// Interactive browsing of one feed, driven by commands on stdin.
async fn browse(config: &Config, client: Client) -> Result<()> {
    let feed = feed_for(config, &config.browse_source)?;
    let mut browser = Browser::new(
        client,
        feed,
        QueryEngine::new(config.filters),
        ConsolePresenter::stdout(),
        config.api.default_page_size,
    );

    browser.start().await?;

    let modes: Vec<_> = ViewMode::ALL.iter().map(ViewMode::key).collect();
    println!("Commands: page N | size N | mode <{}> | refresh | quit", modes.join("|"));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if !browser.execute(command).await? {
                    break;
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    info!("Browser closed");
    Ok(())
}

/// Periodic scrape of every configured HTML source.
async fn watch(config: &Config, client: Client) -> Result<()> {
    let mut scrapers = Vec::new();
    for (key, source) in &config.sources {
        match HtmlScraper::new(key, source) {
            Ok(scraper) => scrapers.push(scraper),
            Err(e) => error!("Skipping source {}: {}", key, e),
        }
    }

    let stores: HashMap<String, DealStore> = scrapers
        .iter()
        .map(|scraper| (scraper.extractor().source().to_string(), DealStore::new()))
        .collect();
    let mut presenter = ConsolePresenter::stdout();

    let mut interval = interval(Duration::from_secs(config.check_interval_seconds));

    loop {
        interval.tick().await;

        info!("--- Starting new check cycle at {} ---", Local::now().format("%Y-%m-%d %H:%M:%S"));

        // Scrape all sources concurrently
        let scraping_futures = scrapers.iter().map(|scraper| {
            let client = &client;
            async move {
                let report = scraper.scrape(client, &scraper.site_config().url).await;
                (scraper, report)
            }
        });

        for (scraper, report) in join_all(scraping_futures).await {
            let name = &scraper.site_config().name;
            let Some(store) = stores.get(scraper.extractor().source()) else {
                continue;
            };

            match report.failure {
                None => {
                    info!("Found {} deals on {}", report.deals.len(), name);
                    let count = report.deals.len();
                    store.load(report.deals, PaginationMeta::new(1, 1, count));
                }
                Some(e) => presenter.render_stale(&e)?,
            }

            let snapshot = store.snapshot();
            presenter.render(&snapshot.deals, &snapshot.meta)?;
        }

        info!("Check cycle completed, waiting {} seconds", config.check_interval_seconds);
    }
}
