pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod parsers;
pub mod query;
pub mod render;
pub mod scrapers;
pub mod store;
pub mod utils;

pub use browser::{Browser, Command};
pub use config::Config;
pub use error::DealError;
pub use models::{Deal, DealId, DealPage, PageQuery, PaginationMeta, RawRecord};
pub use query::{DerivedView, FilterMode, QueryEngine, SortMode, ViewMode};
pub use store::{DealStore, Snapshot};
