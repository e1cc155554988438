//! Station domain types shared by the feed, catalog, cache and query layers.

use serde::{Deserialize, Serialize};

/// Upstream station type.
///
/// Only [`StationType::Open`] stations are visible to the open-station list
/// and nearest-station queries. Values the upstream invents later are kept
/// verbatim in [`StationType::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StationType {
    Open,
    Closed,
    Other(String),
}

impl StationType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            StationType::Open => "OPEN",
            StationType::Closed => "CLOSED",
            StationType::Other(raw) => raw,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, StationType::Open)
    }
}

impl From<String> for StationType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "OPEN" => StationType::Open,
            "CLOSED" => StationType::Closed,
            _ => StationType::Other(raw),
        }
    }
}

impl From<&str> for StationType {
    fn from(raw: &str) -> Self {
        StationType::from(raw.to_string())
    }
}

impl From<StationType> for String {
    fn from(value: StationType) -> Self {
        match value {
            StationType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for StationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable identity and metadata of one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    /// Upstream-assigned identifier; immutable once created.
    pub id: String,
    /// Display name, also the key into the availability cache.
    pub name: String,
    /// Stocking status as free text from the upstream feed.
    pub status: String,
    pub description: String,
    pub has_kiosk: bool,
    pub has_card_reader: bool,
    pub station_type: StationType,
    pub latitude: f64,
    pub longitude: f64,
}

/// Live bike/dock availability for one station.
///
/// Always replaced as a whole value so readers never see bikes from one
/// pass paired with docks from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationCounts {
    pub bikes: u32,
    pub docks: u32,
}
