//! Feed payload parsing.
//!
//! Two entry points share the same record validation:
//!
//! - [`parse_stations`] is all-or-nothing. Catalog bootstrap and metadata
//!   refresh need a complete, self-consistent station set, so one bad
//!   record fails the whole payload.
//! - [`parse_stations_lenient`] validates each record independently so the
//!   counts refresh can skip individual malformed entries.

use bikeshare_core::GeoPoint;
use serde_json::Value;

use crate::error::FeedError;
use crate::types::FeedStation;

/// Parse the payload into stations, failing on the first invalid record.
///
/// # Errors
///
/// Returns [`FeedError::Format`] if the payload is not a JSON array, or if
/// any record is missing a field, has a field of the wrong type, or carries
/// coordinates outside the WGS84 range.
pub fn parse_stations(raw: &[u8]) -> Result<Vec<FeedStation>, FeedError> {
    parse_stations_lenient(raw)?.into_iter().collect()
}

/// Parse the payload, returning one result per record in feed order.
///
/// # Errors
///
/// Returns [`FeedError::Format`] only if the payload as a whole is not a
/// JSON array. Per-record failures are reported inside the returned `Vec`.
pub fn parse_stations_lenient(
    raw: &[u8],
) -> Result<Vec<Result<FeedStation, FeedError>>, FeedError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| FeedError::format("feed payload", e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(FeedError::format(
            "feed payload",
            "expected a JSON array of stations",
        ));
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_record(index, item))
        .collect())
}

fn parse_record(index: usize, item: Value) -> Result<FeedStation, FeedError> {
    let label = record_label(index, &item);
    let station: FeedStation = serde_json::from_value(item)
        .map_err(|e| FeedError::format(label.clone(), e.to_string()))?;

    if station.id.trim().is_empty() {
        return Err(FeedError::format(label, "empty station id"));
    }
    if station.name.trim().is_empty() {
        return Err(FeedError::format(label, "empty station name"));
    }
    if GeoPoint::new(station.latitude(), station.longitude()).is_err() {
        return Err(FeedError::format(
            label,
            format!(
                "location [{}, {}] is outside the WGS84 range",
                station.latitude(),
                station.longitude()
            ),
        ));
    }

    Ok(station)
}

/// Human-readable position of a record for error messages.
fn record_label(index: usize, item: &Value) -> String {
    match item.get("name").and_then(Value::as_str) {
        Some(name) => format!("station #{index} ({name:?})"),
        None => format!("station #{index}"),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
