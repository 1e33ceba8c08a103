pub mod field;

pub use field::{extract, CompiledField, Extracted};

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Selector};
use std::fmt;
use tracing::debug;
use url::Url;

use crate::config::SourceConfig;
use crate::error::DealError;
use crate::models::RawRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Title,
    Price,
    Link,
    Image,
    Temperature,
    Discount,
    Comments,
    Date,
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Price => "price",
            Field::Link => "link",
            Field::Image => "image",
            Field::Temperature => "temperature",
            Field::Discount => "discount",
            Field::Comments => "comments",
            Field::Date => "date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A field that fell back to its default because reading it failed.
#[derive(Debug)]
pub struct FieldIssue {
    pub field: Field,
    pub error: DealError,
}

/// Per-listing result. A partial listing still carries a full record, with
/// defaults in the fields listed in `issues`.
#[derive(Debug)]
pub enum ListingOutcome {
    Complete(RawRecord),
    Partial {
        record: RawRecord,
        issues: Vec<FieldIssue>,
    },
}

impl ListingOutcome {
    pub fn record(&self) -> &RawRecord {
        match self {
            ListingOutcome::Complete(record) => record,
            ListingOutcome::Partial { record, .. } => record,
        }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            ListingOutcome::Complete(_) => &[],
            ListingOutcome::Partial { issues, .. } => issues,
        }
    }

    pub fn into_record(self) -> RawRecord {
        match self {
            ListingOutcome::Complete(record) => record,
            ListingOutcome::Partial { record, .. } => record,
        }
    }
}

/// Applies one source's selector table to listing elements.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    source: String,
    base_url: Option<Url>,
    listing_css: String,
    listing: Selector,
    id: CompiledField,
    title: CompiledField,
    price: CompiledField,
    link: CompiledField,
    image: CompiledField,
    temperature: CompiledField,
    discount: CompiledField,
    comments: CompiledField,
    date: CompiledField,
}

impl ListingExtractor {
    pub fn new(source: &str, config: &SourceConfig) -> Result<Self, DealError> {
        let table = &config.selectors;
        let listing = Selector::parse(&table.listing).map_err(|e| DealError::InvalidSelector {
            selector: table.listing.clone(),
            reason: format!("{:?}", e),
        })?;

        Ok(Self {
            source: source.to_string(),
            base_url: Url::parse(&config.base_url).ok(),
            listing_css: table.listing.clone(),
            listing,
            id: CompiledField::compile(Field::Id, &table.id),
            title: CompiledField::compile(Field::Title, &table.title),
            price: CompiledField::compile(Field::Price, &table.price),
            link: CompiledField::compile(Field::Link, &table.link),
            image: CompiledField::compile(Field::Image, &table.image),
            temperature: CompiledField::compile(Field::Temperature, &table.temperature),
            discount: CompiledField::compile(Field::Discount, &table.discount),
            comments: CompiledField::compile(Field::Comments, &table.comments),
            date: CompiledField::compile(Field::Date, &table.date),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn listing_selector(&self) -> &Selector {
        &self.listing
    }

    pub fn listing_css(&self) -> &str {
        &self.listing_css
    }

    pub fn fields(&self) -> [&CompiledField; 9] {
        [
            &self.id,
            &self.title,
            &self.price,
            &self.link,
            &self.image,
            &self.temperature,
            &self.discount,
            &self.comments,
            &self.date,
        ]
    }

    /// Run every field's chain over one listing element.
    pub fn extract_listing(
        &self,
        element: ElementRef<'_>,
        scraped_at: DateTime<Utc>,
    ) -> ListingOutcome {
        let mut record = RawRecord::empty(&self.source, scraped_at);
        let mut issues = Vec::new();
        let mut matched = 0;

        let mut text = |field: &CompiledField| {
            let extracted = extract(element, field);
            if extracted.matched {
                matched += 1;
            }
            extracted
        };

        let id = text(&self.id);
        record.id = id.matched.then_some(id.value);

        let title = text(&self.title);
        if !title.matched {
            issues.push(FieldIssue {
                field: Field::Title,
                error: DealError::Parse {
                    field: Field::Title,
                    reason: "no title rule matched".to_string(),
                },
            });
        }
        record.title = title.value;

        record.price = text(&self.price).value;
        record.temperature = text(&self.temperature).value;
        record.discount = text(&self.discount).value;
        record.comments = text(&self.comments).value;

        let date = text(&self.date);
        record.date = date.matched.then_some(date.value);

        let link = text(&self.link);
        let image = text(&self.image);
        record.link = self.resolve(Field::Link, link, &mut issues);
        record.image_url = self.resolve(Field::Image, image, &mut issues);

        debug!(
            source = %self.source,
            matched,
            issues = issues.len(),
            "Extracted listing fields"
        );

        if issues.is_empty() {
            ListingOutcome::Complete(record)
        } else {
            ListingOutcome::Partial { record, issues }
        }
    }

    /// Turn an extracted href/src into an absolute URL. A value that cannot be
    /// resolved becomes a field issue and the field stays empty.
    fn resolve(
        &self,
        field: Field,
        extracted: Extracted,
        issues: &mut Vec<FieldIssue>,
    ) -> Option<String> {
        if !extracted.matched {
            return None;
        }

        let resolved = match &self.base_url {
            Some(base) => base.join(&extracted.value),
            None => Url::parse(&extracted.value),
        };

        match resolved {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                issues.push(FieldIssue {
                    field,
                    error: DealError::Parse {
                        field,
                        reason: format!("'{}': {}", extracted.value, e),
                    },
                });
                None
            }
        }
    }
}
