//! Error types for router setup and navigation.

use thiserror::Error;

pub use crate::guard::GuardError;
pub use crate::history::HistoryError;
pub use crate::navigation::NavigationError;

/// Errors building a router or its route table.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The configured base URL is not an absolute URL.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The route table JSON could not be read.
    #[error("Invalid route table: {0}")]
    RouteTable(#[from] serde_json::Error),
}
