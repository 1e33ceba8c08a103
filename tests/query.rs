use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use deal_monitor::config::FilterThresholds;
use deal_monitor::{Deal, DealId, FilterMode, QueryEngine, SortMode, ViewMode};

fn deal(id: &str) -> Deal {
    Deal {
        id: DealId(id.to_string()),
        title: format!("Deal {}", id),
        link: None,
        image_url: None,
        price: 10.0,
        discount: 0.0,
        comments: 0,
        temperature: 0.0,
        date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        source: "test".to_string(),
    }
}

fn ids(deals: &[Deal]) -> Vec<&str> {
    deals.iter().map(|deal| deal.id.0.as_str()).collect()
}

fn engine() -> QueryEngine {
    QueryEngine::new(FilterThresholds::default())
}

#[test]
fn discount_filter_is_strictly_above_threshold_and_keeps_order() {
    let deals: Vec<Deal> = [10.0, 60.0, 51.0, 50.0, 100.0]
        .iter()
        .enumerate()
        .map(|(i, discount)| Deal {
            discount: *discount,
            ..deal(&i.to_string())
        })
        .collect();

    let view = engine().filter(&deals, FilterMode::DiscountDesc);
    assert_eq!(ids(&view.deals), vec!["1", "2", "4"]);
    assert_eq!(view.count(), 3);
}

#[test]
fn comment_and_temperature_filters_use_their_thresholds() {
    let deals = vec![
        Deal { comments: 15, temperature: 100.0, ..deal("edge") },
        Deal { comments: 16, ..deal("talked") },
        Deal { temperature: 100.5, ..deal("warm") },
    ];

    assert_eq!(
        ids(&engine().filter(&deals, FilterMode::MostCommented).deals),
        vec!["talked"]
    );
    assert_eq!(ids(&engine().filter(&deals, FilterMode::HotDeals).deals), vec!["warm"]);
    assert_eq!(engine().filter(&deals, FilterMode::None).deals, deals);
}

#[test]
fn custom_thresholds_are_honoured() {
    let engine = QueryEngine::new(FilterThresholds {
        discount: 20.0,
        comments: 0,
        temperature: -50.0,
    });
    let deals = vec![
        Deal { discount: 25.0, comments: 1, ..deal("a") },
        Deal { temperature: -80.0, ..deal("b") },
    ];

    assert_eq!(ids(&engine.filter(&deals, FilterMode::DiscountDesc).deals), vec!["a"]);
    assert_eq!(ids(&engine.filter(&deals, FilterMode::MostCommented).deals), vec!["a"]);
    assert_eq!(ids(&engine.filter(&deals, FilterMode::HotDeals).deals), vec!["a"]);
}

#[test]
fn price_sorts_are_stable_and_mirror_each_other() {
    let deals = vec![
        Deal { price: 30.0, ..deal("c") },
        Deal { price: 10.0, ..deal("a1") },
        Deal { price: 20.0, ..deal("b") },
        Deal { price: 10.0, ..deal("a2") },
    ];

    let asc = engine().sort(&deals, SortMode::PriceAsc);
    let desc = engine().sort(&deals, SortMode::PriceDesc);

    assert_eq!(ids(&asc.deals), vec!["a1", "a2", "b", "c"]);
    // Ties keep their loaded order in both directions.
    assert_eq!(ids(&desc.deals), vec!["c", "b", "a1", "a2"]);
}

#[test]
fn date_sorts_order_by_timestamp() {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let deals = vec![
        Deal { date: base + Duration::hours(2), ..deal("noon") },
        Deal { date: base - Duration::days(1), ..deal("yesterday") },
        Deal { date: base, ..deal("morning") },
    ];

    let asc = engine().sort(&deals, SortMode::DateAsc);
    let desc = engine().sort(&deals, SortMode::DateDesc);

    assert_eq!(ids(&asc.deals), vec!["yesterday", "morning", "noon"]);
    let mut reversed = ids(&desc.deals);
    reversed.reverse();
    assert_eq!(reversed, ids(&asc.deals));
}

#[test]
fn views_never_touch_their_input() {
    let deals = vec![
        Deal { price: 3.0, discount: 70.0, ..deal("x") },
        Deal { price: 1.0, ..deal("y") },
    ];
    let before = deals.clone();

    for mode in ViewMode::ALL {
        let view = engine().apply(&deals, mode);
        assert_eq!(view.mode, mode);
    }
    assert_eq!(deals, before);
}

#[test]
fn empty_input_gives_empty_views() {
    for mode in ViewMode::ALL {
        let view = engine().apply(&[], mode);
        assert!(view.is_empty());
        assert_eq!(view.count(), 0);
    }
}
