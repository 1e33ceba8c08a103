use std::collections::{HashMap, HashSet};

use crate::models::{Deal, DealId, RawRecord};
use crate::parsers::{clean_text, parse_amount, parse_count, parse_signed, parse_timestamp};

/// Type every field of a raw record. Unparseable numbers become 0, a missing
/// or unreadable date becomes the extraction time.
pub fn normalize(raw: &RawRecord) -> Deal {
    let title = clean_text(&raw.title);

    Deal {
        id: deal_id(raw, &title),
        link: non_empty(raw.link.as_deref()),
        image_url: non_empty(raw.image_url.as_deref()),
        price: parse_amount(&raw.price).unwrap_or(0.0),
        // Left unclamped: sources occasionally publish values above 100.
        discount: parse_amount(&raw.discount).unwrap_or(0.0),
        comments: parse_count(&raw.comments).unwrap_or(0),
        temperature: parse_signed(&raw.temperature).unwrap_or(0.0),
        date: raw
            .date
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(raw.scraped_at),
        source: raw.source.clone(),
        title,
    }
}

/// Source id when one was published, else an md5 digest over
/// source, link and title so the same listing always maps to the same id.
fn deal_id(raw: &RawRecord, title: &str) -> DealId {
    if let Some(id) = raw.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        return DealId(id.to_string());
    }

    let link = raw.link.as_deref().unwrap_or("").trim().to_lowercase();
    let id_string = [raw.source.to_lowercase(), link, title.to_lowercase()].join("|");

    DealId(format!("{:x}", md5::compute(id_string.as_bytes())))
}

/// Make ids unique within one batch. The second and later occurrences of an
/// id get `-2`, `-3`, ... appended in batch order, so the same input always
/// yields the same ids.
pub fn disambiguate_ids(deals: &mut [Deal]) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut repeats: HashMap<String, u32> = HashMap::new();

    for deal in deals.iter_mut() {
        if seen.insert(deal.id.0.clone()) {
            continue;
        }

        let base = deal.id.0.clone();
        let occurrence = repeats.entry(base.clone()).or_insert(1);
        loop {
            *occurrence += 1;
            let candidate = format!("{}-{}", base, occurrence);
            if seen.insert(candidate.clone()) {
                deal.id = DealId(candidate);
                break;
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn raw() -> RawRecord {
        let mut raw = RawRecord::empty("dealabs", Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        raw.title = "Lego Star Wars 75192".to_string();
        raw.link = Some("https://www.dealabs.com/bons-plans/75192".to_string());
        raw.price = "649,99 €".to_string();
        raw.discount = "-19 %".to_string();
        raw.comments = "23".to_string();
        raw.temperature = "412°".to_string();
        raw
    }

    #[test]
    fn types_every_field() {
        let deal = normalize(&raw());
        assert_eq!(deal.price, 649.99);
        assert_eq!(deal.discount, 19.0);
        assert_eq!(deal.comments, 23);
        assert_eq!(deal.temperature, 412.0);
        assert_eq!(deal.source, "dealabs");
        assert_eq!(deal.image_url, None);
    }

    #[test]
    fn missing_price_defaults_to_zero() {
        for price in ["", "Price not found", "Gratuit"] {
            let mut raw = raw();
            raw.price = price.to_string();
            assert_eq!(normalize(&raw).price, 0.0);
        }
    }

    #[test]
    fn discount_is_not_clamped() {
        let mut raw = raw();
        raw.discount = "150%".to_string();
        assert_eq!(normalize(&raw).discount, 150.0);
    }

    #[test]
    fn negative_temperature_survives() {
        let mut raw = raw();
        raw.temperature = "-35°".to_string();
        assert_eq!(normalize(&raw).temperature, -35.0);
    }

    #[test]
    fn date_falls_back_to_extraction_time() {
        let mut raw = raw();
        assert_eq!(normalize(&raw).date, raw.scraped_at);

        raw.date = Some("yesterday".to_string());
        assert_eq!(normalize(&raw).date, raw.scraped_at);

        raw.date = Some("1705312800".to_string());
        assert_eq!(
            normalize(&raw).date,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn derived_id_is_idempotent_and_time_independent() {
        let first = normalize(&raw());
        let mut later = raw();
        later.scraped_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(first.id, normalize(&raw()).id);
        assert_eq!(first.id, normalize(&later).id);
        assert_eq!(first.id.0.len(), 32);
    }

    #[test]
    fn derived_id_depends_on_source_link_and_title() {
        let base = normalize(&raw()).id;

        let mut other = raw();
        other.source = "hotukdeals".to_string();
        assert_ne!(base, normalize(&other).id);

        let mut other = raw();
        other.title = "Lego Star Wars 75313".to_string();
        assert_ne!(base, normalize(&other).id);
    }

    #[test]
    fn repeated_ids_get_occurrence_suffixes() {
        let deal = normalize(&raw());
        let mut other = raw();
        other.id = Some(format!("{}-2", deal.id));
        let taken = normalize(&other);

        let mut batch = vec![deal.clone(), deal.clone(), taken, deal.clone()];
        disambiguate_ids(&mut batch);

        let ids: Vec<String> = batch.iter().map(|d| d.id.0.clone()).collect();
        assert_eq!(
            ids,
            vec![
                deal.id.0.clone(),
                format!("{}-2", deal.id),
                format!("{}-2-2", deal.id),
                format!("{}-3", deal.id),
            ]
        );
    }

    #[test]
    fn source_id_wins_over_digest() {
        let mut raw = raw();
        raw.id = Some("  thread_2718281 ".to_string());
        assert_eq!(normalize(&raw).id, DealId("thread_2718281".to_string()));
    }
}
