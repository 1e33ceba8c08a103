use crate::models::{Deal, PaginationMeta};
use crate::parsers::clean_text;

const MAX_TITLE_CHARS: usize = 120;

pub fn format_price(price: f64) -> String {
    format!("{:.2} €", price)
}

/// Two or three lines describing one deal: title, figures, then the link when
/// there is one.
pub fn format_deal(deal: &Deal) -> String {
    let mut lines = vec![format!("[{}] {}", deal.id, display_title(&deal.title))];

    lines.push(format!(
        "    {} - Discount: {:.2}% - Comments: {} - Temperature: {}° - Date: {}",
        format_price(deal.price),
        deal.discount,
        deal.comments,
        deal.temperature,
        deal.date.format("%Y-%m-%d")
    ));

    if let Some(link) = &deal.link {
        lines.push(format!("    {}", link));
    }

    lines.join("\n")
}

pub fn format_pagination(meta: &PaginationMeta) -> String {
    format!("Page {}/{}", meta.current_page, meta.page_count)
}

fn display_title(title: &str) -> String {
    let title = clean_text(title);
    if title.is_empty() {
        return "Untitled deal".to_string();
    }

    if title.chars().count() > MAX_TITLE_CHARS {
        let truncated: String = title.chars().take(MAX_TITLE_CHARS).collect();
        format!("{}...", truncated)
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DealId;
    use chrono::{TimeZone, Utc};

    fn deal(title: &str) -> Deal {
        Deal {
            id: DealId("42".to_string()),
            title: title.to_string(),
            link: Some("https://www.dealabs.com/bons-plans/42".to_string()),
            image_url: None,
            price: 19.9,
            discount: 12.5,
            comments: 3,
            temperature: 154.0,
            date: Utc.with_ymd_and_hms(2024, 2, 29, 18, 30, 0).unwrap(),
            source: "dealabs".to_string(),
        }
    }

    #[test]
    fn formats_all_figures() {
        let text = format_deal(&deal("Lego Creator"));
        assert_eq!(
            text,
            "[42] Lego Creator\n    19.90 € - Discount: 12.50% - Comments: 3 - Temperature: 154° - Date: 2024-02-29\n    https://www.dealabs.com/bons-plans/42"
        );
    }

    #[test]
    fn empty_title_gets_placeholder() {
        assert!(format_deal(&deal("")).starts_with("[42] Untitled deal"));
    }

    #[test]
    fn long_titles_are_cut_on_char_boundaries() {
        let title = "é".repeat(200);
        let first_line = format_deal(&deal(&title)).lines().next().unwrap().to_string();
        assert!(first_line.ends_with("..."));
        assert_eq!(first_line.chars().filter(|c| *c == 'é').count(), MAX_TITLE_CHARS);
    }
}
