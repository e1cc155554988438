use bikeshare_db::DbError;
use bikeshare_feed::FeedError;
use thiserror::Error;

/// Failure of one reconciliation pass.
///
/// No variant advances a fingerprint slot, so the next scheduled pass
/// retries the same payload.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The feed could not be fetched. Nothing was touched.
    #[error("feed unavailable: {0}")]
    Transient(#[source] FeedError),

    /// The payload does not have the expected shape.
    #[error("feed rejected: {0}")]
    Format(#[source] FeedError),

    /// The catalog store failed mid-pass.
    #[error("catalog store failed: {0}")]
    StoreWrite(#[from] DbError),
}

impl From<FeedError> for SyncError {
    fn from(err: FeedError) -> Self {
        if err.is_transient() {
            Self::Transient(err)
        } else {
            Self::Format(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("station not found: {0}")]
    StationNotFound(String),

    #[error("no open station found nearby")]
    NoStationFound,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Store(DbError),
}

impl From<DbError> for QueryError {
    fn from(err: DbError) -> Self {
        Self::Store(err)
    }
}
