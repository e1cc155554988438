//! Upstream station feed: fetching, strict parsing, popup count extraction
//! and payload fingerprints.

pub mod client;
pub mod error;
pub mod fingerprint;
pub mod parse;
pub mod popup;
pub mod types;

pub use client::{FeedClient, FeedClientConfig};
pub use error::FeedError;
pub use fingerprint::Fingerprint;
pub use parse::{parse_stations, parse_stations_lenient};
pub use popup::extract_counts;
pub use types::FeedStation;
