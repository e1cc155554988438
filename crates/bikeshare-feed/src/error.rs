use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Network, TLS or timeout failure talking to the feed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The payload (or one record in it) does not have the expected shape.
    #[error("feed format error in {context}: {reason}")]
    Format { context: String, reason: String },
}

impl FeedError {
    pub(crate) fn format(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// `true` for failures that the next scheduled fetch may not hit again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::UnexpectedStatus { .. })
    }
}
