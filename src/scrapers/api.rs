use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::DealError;
use crate::models::{DealPage, PageQuery, PaginationMeta, RawRecord, API_SOURCE};
use crate::normalize::{disambiguate_ids, normalize};
use crate::scrapers::DealFeed;
use crate::utils::http::fetch;

/// Client for the paginated JSON deals endpoint.
pub struct ApiFeed {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    data: Option<ApiData>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    result: Vec<ApiDeal>,
    meta: PaginationMeta,
}

/// Deal as published by the API. Every field is optional and numbers may
/// arrive as JSON numbers or strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDeal {
    pub uuid: Option<Value>,
    pub id: Option<Value>,
    pub title: Option<String>,
    pub link: Option<String>,
    #[serde(alias = "photo")]
    pub image_url: Option<String>,
    pub price: Option<Value>,
    pub discount: Option<Value>,
    pub comments: Option<Value>,
    pub temperature: Option<Value>,
    #[serde(alias = "published")]
    pub date: Option<Value>,
}

impl ApiDeal {
    pub fn into_raw(self, scraped_at: DateTime<Utc>) -> RawRecord {
        let id = self
            .uuid
            .as_ref()
            .and_then(scalar_text)
            .or_else(|| self.id.as_ref().and_then(scalar_text));

        RawRecord {
            source: API_SOURCE.to_string(),
            scraped_at,
            id,
            title: self.title.unwrap_or_default(),
            price: number_text(self.price.as_ref()),
            link: self.link,
            image_url: self.image_url,
            temperature: number_text(self.temperature.as_ref()),
            discount: number_text(self.discount.as_ref()),
            comments: number_text(self.comments.as_ref()),
            date: self.date.as_ref().and_then(scalar_text),
        }
    }
}

impl ApiFeed {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, query: PageQuery) -> Result<String, DealError> {
        let encoded = serde_urlencoded::to_string(query).map_err(|e| DealError::MalformedResponse {
            url: self.base_url.clone(),
            reason: format!("could not encode query: {}", e),
        })?;
        Ok(format!("{}/deals?{}", self.base_url, encoded))
    }
}

#[async_trait]
impl DealFeed for ApiFeed {
    async fn fetch_page(&self, client: &Client, query: PageQuery) -> Result<DealPage, DealError> {
        let url = self.page_url(query)?;
        let response = fetch(client, &url, None).await?;
        let body = response.text().await.map_err(|source| DealError::Transport {
            url: url.clone(),
            source,
        })?;

        let page = parse_api_response(&body, &url, Utc::now())?;
        info!(
            "Fetched {} deals from API (page {}/{}, {} total)",
            page.deals.len(),
            page.meta.current_page,
            page.meta.page_count,
            page.meta.count
        );
        Ok(page)
    }

    fn name(&self) -> &str {
        "deals API"
    }
}

/// Decode a `{ success, data: { result, meta } }` body into a normalized page.
pub fn parse_api_response(
    body: &str,
    url: &str,
    scraped_at: DateTime<Utc>,
) -> Result<DealPage, DealError> {
    let malformed = |reason: String| DealError::MalformedResponse {
        url: url.to_string(),
        reason,
    };

    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;

    if !response.success {
        warn!("Deals API reported failure for {}", url);
        return Err(malformed("success flag is false".to_string()));
    }

    let data = response
        .data
        .ok_or_else(|| malformed("missing data object".to_string()))?;

    let mut deals: Vec<_> = data
        .result
        .into_iter()
        .map(|deal| normalize(&deal.into_raw(scraped_at)))
        .collect();
    disambiguate_ids(&mut deals);

    Ok(DealPage {
        deals,
        meta: data.meta.normalized(),
    })
}

/// Identifier or timestamp text; integers keep their exact digits.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Fixed two decimals so the shared text parser never reads a JSON fraction
// as a thousands group.
fn number_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => n.as_f64().map(|v| format!("{:.2}", v)).unwrap_or_default(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DealId;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn decodes_a_successful_page() {
        let body = r#"{
            "success": true,
            "data": {
                "result": [
                    {
                        "uuid": "c1a5b7e2", "id": "42115", "title": "Lamborghini Sián",
                        "link": "https://www.dealabs.com/bons-plans/42115",
                        "photo": "https://static.dealabs.com/42115.jpg",
                        "price": 299.99, "discount": 1234.567, "comments": 27,
                        "temperature": -14.5, "published": 1705312800
                    },
                    { "title": "Bare deal" }
                ],
                "meta": { "currentPage": 2, "pageCount": 8, "count": 47 }
            }
        }"#;

        let page = parse_api_response(body, "https://api.test/deals", now()).unwrap();
        assert_eq!(page.meta, PaginationMeta::new(2, 8, 47));

        let full = &page.deals[0];
        assert_eq!(full.id, DealId("c1a5b7e2".to_string()));
        assert_eq!(full.image_url.as_deref(), Some("https://static.dealabs.com/42115.jpg"));
        assert_eq!(full.price, 299.99);
        assert_eq!(full.discount, 1234.57);
        assert_eq!(full.comments, 27);
        assert_eq!(full.temperature, -14.5);
        assert_eq!(full.date, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
        assert_eq!(full.source, API_SOURCE);

        let bare = &page.deals[1];
        assert_eq!(bare.price, 0.0);
        assert_eq!(bare.comments, 0);
        assert_eq!(bare.date, now());
        assert_eq!(bare.link, None);
    }

    #[test]
    fn success_false_is_malformed() {
        let err = parse_api_response(r#"{"success":false,"data":null}"#, "u", now()).unwrap_err();
        assert!(matches!(err, DealError::MalformedResponse { .. }));
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn shape_violations_are_malformed() {
        for body in ["not json", r#"{"success":true}"#, r#"{"success":true,"data":{"result":3}}"#] {
            let err = parse_api_response(body, "u", now()).unwrap_err();
            assert!(matches!(err, DealError::MalformedResponse { .. }), "{}", body);
        }
    }

    #[test]
    fn numeric_id_is_used_without_uuid() {
        let deal = ApiDeal {
            id: Some(serde_json::json!(75192)),
            ..Default::default()
        };
        assert_eq!(deal.into_raw(now()).id.as_deref(), Some("75192"));
    }

    #[test]
    fn page_url_encodes_query() {
        let feed = ApiFeed::new("https://api.test/");
        assert_eq!(
            feed.page_url(PageQuery::new(3, 12)).unwrap(),
            "https://api.test/deals?page=3&size=12"
        );
    }
}
