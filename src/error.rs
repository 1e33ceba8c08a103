use reqwest::StatusCode;
use thiserror::Error;

use crate::extract::Field;

/// Failure kinds of the deal pipeline. None of them is fatal to the process:
/// fetch-level kinds leave the caller with its previous state and field-level
/// kinds fall back to the field default.
#[derive(Debug, Error)]
pub enum DealError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status}: {url}")]
    Status { url: String, status: StatusCode },

    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("no listing elements matched '{selector}' on {url}")]
    NoListings { url: String, selector: String },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("could not read {field}: {reason}")]
    Parse { field: Field, reason: String },
}

impl DealError {
    /// True for the kinds that mean "no data this cycle".
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            DealError::Transport { .. }
                | DealError::Status { .. }
                | DealError::MalformedResponse { .. }
                | DealError::NoListings { .. }
        )
    }
}
