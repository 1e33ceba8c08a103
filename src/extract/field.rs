use scraper::{ElementRef, Selector};
use tracing::warn;

use super::Field;
use crate::config::{FieldRules, Locate, Read};
use crate::parsers::clean_text;

#[derive(Debug, Clone)]
enum Target {
    Root,
    Css(Selector),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    target: Target,
    read: Read,
}

/// A field's candidate rules with selectors parsed once up front.
#[derive(Debug, Clone)]
pub struct CompiledField {
    field: Field,
    rules: Vec<CompiledRule>,
    default: Option<String>,
}

/// Result of one field lookup. `matched` is false when every rule missed and
/// `value` holds the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub value: String,
    pub matched: bool,
}

impl CompiledField {
    /// Rules whose selector does not parse are logged and skipped so one typo
    /// in a table never disables the rest of the chain.
    pub fn compile(field: Field, config: &FieldRules) -> Self {
        let rules = config
            .rules
            .iter()
            .filter_map(|rule| {
                let target = match &rule.locate {
                    Locate::Root => Target::Root,
                    Locate::Css(css) => match Selector::parse(css) {
                        Ok(selector) => Target::Css(selector),
                        Err(e) => {
                            warn!("Skipping {} rule with invalid selector '{}': {:?}", field, css, e);
                            return None;
                        }
                    },
                };
                Some(CompiledRule {
                    target,
                    read: rule.read.clone(),
                })
            })
            .collect();

        Self {
            field,
            rules,
            default: config.default.clone(),
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of listing descendants each rule's selector hits. `Root` rules
    /// count as one.
    pub fn match_counts(&self, element: ElementRef<'_>) -> Vec<usize> {
        self.rules
            .iter()
            .map(|rule| match &rule.target {
                Target::Root => 1,
                Target::Css(selector) => element.select(selector).count(),
            })
            .collect()
    }
}

/// Evaluate `field`'s rules in order against one listing element and return
/// the first value produced. Never fails: a full miss yields the default.
pub fn extract(element: ElementRef<'_>, field: &CompiledField) -> Extracted {
    for rule in &field.rules {
        let value = match &rule.target {
            Target::Root => read(element, &rule.read),
            Target::Css(selector) => element
                .select(selector)
                .find_map(|candidate| read(candidate, &rule.read)),
        };

        if let Some(value) = value {
            return Extracted {
                value,
                matched: true,
            };
        }
    }

    Extracted {
        value: field.default.clone().unwrap_or_default(),
        matched: false,
    }
}

fn read(element: ElementRef<'_>, read: &Read) -> Option<String> {
    let value = match read {
        Read::Text => clean_text(&element.text().collect::<String>()),
        Read::Attr(name) => element.value().attr(name)?.trim().to_string(),
    };

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
