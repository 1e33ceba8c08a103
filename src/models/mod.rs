pub mod deal;
pub mod page;

pub use deal::*;
pub use page::*;

/// Source tag for deals that come from the JSON deals API.
pub const API_SOURCE: &str = "api";
