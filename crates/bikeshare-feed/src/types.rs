//! Wire types for the upstream station feed.
//!
//! ## Observed shape
//!
//! The feed is a bare JSON array, one object per station:
//!
//! ```json
//! {
//!   "id": "6e1f1b7c-…",
//!   "name": "Penn Station",
//!   "description": "Charles St & Lanvale St",
//!   "type": "OPEN",
//!   "stationStockingStatus": "STOCKED",
//!   "hasKiosk": true,
//!   "hasCardReader": true,
//!   "location": [39.3073, -76.6157],
//!   "popup": "<div>…<span class=\"station-bikes\"><b>4</b> bikes</span>…</div>"
//! }
//! ```
//!
//! Older payloads spelled the flags in snake case (`station_stocking_status`,
//! `has_kiosk`, `has_ccreader`); both spellings are accepted.
//!
//! Every field is required and nothing has a `#[serde(default)]`: a missing
//! field is a format error, never a `false` or empty string in the catalog.
//! Unknown extra fields are ignored.

use bikeshare_core::{StationRecord, StationType};
use serde::Deserialize;

/// One station object from the feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedStation {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub station_type: String,
    #[serde(rename = "stationStockingStatus", alias = "station_stocking_status")]
    pub stocking_status: String,
    #[serde(rename = "hasKiosk", alias = "has_kiosk")]
    pub has_kiosk: bool,
    #[serde(rename = "hasCardReader", alias = "has_ccreader")]
    pub has_card_reader: bool,
    /// `[latitude, longitude]` in degrees.
    pub location: [f64; 2],
    /// HTML fragment carrying the live bike and dock counts.
    pub popup: String,
}

impl FeedStation {
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.location[0]
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.location[1]
    }

    /// Catalog view of this station (everything except live counts).
    #[must_use]
    pub fn to_record(&self) -> StationRecord {
        StationRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            status: self.stocking_status.clone(),
            description: self.description.clone(),
            has_kiosk: self.has_kiosk,
            has_card_reader: self.has_card_reader,
            station_type: StationType::from(self.station_type.as_str()),
            latitude: self.latitude(),
            longitude: self.longitude(),
        }
    }
}
