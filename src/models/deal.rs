use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// NewType pattern for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DealId(pub String);

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical deal record. Every field carries a typed value after
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub comments: u32,
    pub temperature: f64,
    pub date: DateTime<Utc>,
    pub source: String,
}

/// Field values as found on the page, before any typing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub source: String,
    pub scraped_at: DateTime<Utc>,
    pub id: Option<String>,
    pub title: String,
    pub price: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub temperature: String,
    pub discount: String,
    pub comments: String,
    pub date: Option<String>,
}

impl RawRecord {
    pub fn empty(source: &str, scraped_at: DateTime<Utc>) -> Self {
        Self {
            source: source.to_string(),
            scraped_at,
            id: None,
            title: String::new(),
            price: String::new(),
            link: None,
            image_url: None,
            temperature: String::new(),
            discount: String::new(),
            comments: String::new(),
            date: None,
        }
    }
}
