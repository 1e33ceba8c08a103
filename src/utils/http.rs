use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::DealError;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Shared client carrying a browser-like header set and a cookie jar; many deal
/// sites refuse or strip markup for clients without them.
pub fn create_client(config: &Config) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(&config.accept_language)?);

    let client = ClientBuilder::new()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .pool_max_idle_per_host(6)
        .build()?;

    Ok(client)
}

/// Single GET. Transport failures and non-2xx statuses come back as
/// [`DealError`]; there is no retry.
pub async fn fetch(client: &Client, url: &str, referer: Option<&str>) -> Result<Response, DealError> {
    let mut request = client.get(url);
    if let Some(referer) = referer {
        request = request.header(REFERER, referer);
    }

    let response = request.send().await.map_err(|source| {
        error!("Request failed for {}: {}", url, source);
        DealError::Transport {
            url: url.to_string(),
            source,
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!("HTTP error {}: {}", status, url);
        return Err(DealError::Status {
            url: url.to_string(),
            status,
        });
    }

    info!(%status, url, "Fetched page");
    Ok(response)
}

pub async fn fetch_html(client: &Client, url: &str, referer: Option<&str>) -> Result<String, DealError> {
    let response = fetch(client, url, referer).await?;
    response.text().await.map_err(|source| DealError::Transport {
        url: url.to_string(),
        source,
    })
}
