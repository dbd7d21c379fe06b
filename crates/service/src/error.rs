// ABOUTME: Error type of the query surface.
// ABOUTME: is_client_error() separates caller mistakes from upstream failures.

use smartyshop_assistant::AssistantError;
use smartyshop_scrapers::ScrapeError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("scraping {site} failed")]
    ScrapeFailed {
        site: String,
        #[source]
        source: ScrapeError,
    },

    #[error("no fresh results cached for site {site:?} and query {query:?}")]
    NotCached { site: String, query: String },

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("assistant is not configured")]
    AssistantUnavailable,
}

impl ServiceError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ServiceError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the request itself rather than an upstream or
    /// configuration failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidInput { .. } | ServiceError::NotCached { .. }
        )
    }
}
