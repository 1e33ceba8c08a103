//! Filters and sorts over the loaded deals. Everything here works on a
//! borrowed slice and returns a fresh [`DerivedView`]; the store is never
//! touched.

use std::fmt;
use std::str::FromStr;

use crate::config::FilterThresholds;
use crate::models::Deal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    None,
    DiscountDesc,
    MostCommented,
    HotDeals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    PriceAsc,
    PriceDesc,
    DateAsc,
    DateDesc,
}

/// The single mode selector of the browsing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Filter(FilterMode),
    Sort(SortMode),
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Filter(FilterMode::None)
    }
}

impl ViewMode {
    pub const ALL: [ViewMode; 8] = [
        ViewMode::Filter(FilterMode::None),
        ViewMode::Filter(FilterMode::DiscountDesc),
        ViewMode::Filter(FilterMode::MostCommented),
        ViewMode::Filter(FilterMode::HotDeals),
        ViewMode::Sort(SortMode::PriceAsc),
        ViewMode::Sort(SortMode::PriceDesc),
        ViewMode::Sort(SortMode::DateAsc),
        ViewMode::Sort(SortMode::DateDesc),
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ViewMode::Filter(FilterMode::None) => "none",
            ViewMode::Filter(FilterMode::DiscountDesc) => "discount-desc",
            ViewMode::Filter(FilterMode::MostCommented) => "most-commented",
            ViewMode::Filter(FilterMode::HotDeals) => "hot-deals",
            ViewMode::Sort(SortMode::PriceAsc) => "price-asc",
            ViewMode::Sort(SortMode::PriceDesc) => "price-desc",
            ViewMode::Sort(SortMode::DateAsc) => "date-asc",
            ViewMode::Sort(SortMode::DateDesc) => "date-desc",
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == ViewMode::Filter(FilterMode::None)
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        ViewMode::ALL
            .into_iter()
            .find(|mode| mode.key() == key)
            .ok_or_else(|| {
                let known: Vec<_> = ViewMode::ALL.iter().map(ViewMode::key).collect();
                format!("unknown mode '{}' (expected one of: {})", s.trim(), known.join(", "))
            })
    }
}

/// A filtered or sorted projection of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView {
    pub mode: ViewMode,
    pub deals: Vec<Deal>,
}

impl DerivedView {
    /// The count to display for this view.
    pub fn count(&self) -> usize {
        self.deals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine {
    thresholds: FilterThresholds,
}

impl QueryEngine {
    pub fn new(thresholds: FilterThresholds) -> Self {
        Self { thresholds }
    }

    pub fn apply(&self, deals: &[Deal], mode: ViewMode) -> DerivedView {
        match mode {
            ViewMode::Filter(filter) => self.filter(deals, filter),
            ViewMode::Sort(sort) => self.sort(deals, sort),
        }
    }

    /// Keep the deals passing `mode`'s predicate, in their loaded order.
    pub fn filter(&self, deals: &[Deal], mode: FilterMode) -> DerivedView {
        let t = self.thresholds;
        let keep = |deal: &Deal| match mode {
            FilterMode::None => true,
            FilterMode::DiscountDesc => deal.discount > t.discount,
            FilterMode::MostCommented => deal.comments > t.comments,
            FilterMode::HotDeals => deal.temperature > t.temperature,
        };

        DerivedView {
            mode: ViewMode::Filter(mode),
            deals: deals.iter().filter(|deal| keep(*deal)).cloned().collect(),
        }
    }

    /// Stable sort of a copy; equal keys keep their loaded order.
    pub fn sort(&self, deals: &[Deal], mode: SortMode) -> DerivedView {
        let mut sorted = deals.to_vec();
        match mode {
            SortMode::PriceAsc => sorted.sort_by(|a, b| a.price.total_cmp(&b.price)),
            SortMode::PriceDesc => sorted.sort_by(|a, b| b.price.total_cmp(&a.price)),
            SortMode::DateAsc => sorted.sort_by(|a, b| a.date.cmp(&b.date)),
            SortMode::DateDesc => sorted.sort_by(|a, b| b.date.cmp(&a.date)),
        }

        DerivedView {
            mode: ViewMode::Sort(mode),
            deals: sorted,
        }
    }
}
