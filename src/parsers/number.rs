use once_cell::sync::Lazy;
use regex::Regex;

// Optional sign, then a digit run that may contain thousand/decimal
// separators and inner spaces, always ending on a digit.
static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([-−])?(\d(?:[\d.,'\s]*\d)?)")
        .expect("Invalid number regex")
});

/// Parse the first unsigned amount in free-form text: "1 299,99 €",
/// "€1,299.99", "-50 %" (read as 50). Returns `None` for text without digits,
/// such as "Price not found".
pub fn parse_amount(text: &str) -> Option<f64> {
    let captures = NUMBER_REGEX.captures(text)?;
    interpret_digits(captures.get(2)?.as_str())
}

/// Like [`parse_amount`] but honours a leading minus ("-12°").
pub fn parse_signed(text: &str) -> Option<f64> {
    let captures = NUMBER_REGEX.captures(text)?;
    let value = interpret_digits(captures.get(2)?.as_str())?;
    if captures.get(1).is_some() {
        Some(-value)
    } else {
        Some(value)
    }
}

/// Parse a non-negative integer count ("42 comments", "1 204").
pub fn parse_count(text: &str) -> Option<u32> {
    parse_amount(text).map(|value| value.trunc() as u32)
}

/// The last separator is a decimal point when followed by one or two digits,
/// otherwise every separator groups thousands.
fn interpret_digits(digits: &str) -> Option<f64> {
    let compact: String = digits
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect();

    let normalized = match compact.rfind(|c| c == '.' || c == ',') {
        Some(idx) => {
            let fraction = &compact[idx + 1..];
            let integer: String = compact[..idx]
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            if (1..=2).contains(&fraction.len()) {
                format!("{}.{}", integer, fraction)
            } else {
                format!("{}{}", integer, fraction)
            }
        }
        None => compact,
    };

    normalized.parse::<f64>().ok()
}
