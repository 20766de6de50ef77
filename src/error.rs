//! Failure modes of a single price check.

use thiserror::Error;

/// Errors that abort an invocation.
///
/// A missing price on the listing page is not an error: it is reported as
/// [`CheckOutcome::NotFound`](crate::watch::CheckOutcome::NotFound).
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to fetch {url}: {cause:#}")]
    Fetch { url: String, cause: anyhow::Error },

    #[error("price store failed: {cause:#}")]
    Persistence { cause: anyhow::Error },

    #[error("failed to send price alert: {cause:#}")]
    Notification { cause: anyhow::Error },
}

impl WatchError {
    pub(crate) fn persistence(cause: anyhow::Error) -> Self {
        Self::Persistence { cause }
    }

    pub(crate) fn notification(cause: anyhow::Error) -> Self {
        Self::Notification { cause }
    }
}
