use bikeshare_core::StationType;
use serde_json::json;

use super::*;

fn station_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "Charles St & Lanvale St",
        "type": "OPEN",
        "stationStockingStatus": "STOCKED",
        "hasKiosk": true,
        "hasCardReader": false,
        "location": [39.3073, -76.6157],
        "popup": "<span class=\"station-bikes\"><b>4</b></span><span class=\"station-docks\"><b>11</b></span>"
    })
}

fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).expect("serialize fixture")
}

#[test]
fn parses_well_formed_payload_in_feed_order() {
    let payload = json!([station_json("a", "Penn Station"), station_json("b", "Pier 1")]);
    let stations = parse_stations(&to_bytes(&payload)).expect("valid payload");

    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].name, "Penn Station");
    assert_eq!(stations[1].id, "b");
    assert!((stations[0].latitude() - 39.3073).abs() < f64::EPSILON);
    assert!((stations[0].longitude() + 76.6157).abs() < f64::EPSILON);
}

#[test]
fn to_record_maps_every_catalog_field() {
    let payload = json!([station_json("a", "Penn Station")]);
    let station = parse_stations(&to_bytes(&payload)).unwrap().remove(0);
    let record = station.to_record();

    assert_eq!(record.id, "a");
    assert_eq!(record.name, "Penn Station");
    assert_eq!(record.status, "STOCKED");
    assert_eq!(record.description, "Charles St & Lanvale St");
    assert!(record.has_kiosk);
    assert!(!record.has_card_reader);
    assert_eq!(record.station_type, StationType::Open);
}

#[test]
fn accepts_legacy_snake_case_field_names() {
    let payload = json!([{
        "id": "a",
        "name": "Penn Station",
        "description": "",
        "type": "CLOSED",
        "station_stocking_status": "EMPTY",
        "has_kiosk": false,
        "has_ccreader": true,
        "location": [39.3, -76.6],
        "popup": ""
    }]);
    let stations = parse_stations(&to_bytes(&payload)).expect("legacy spelling accepted");
    assert_eq!(stations[0].stocking_status, "EMPTY");
    assert!(stations[0].has_card_reader);
}

#[test]
fn ignores_unknown_extra_fields() {
    let mut record = station_json("a", "Penn Station");
    record["bikeAngelPoints"] = json!(3);
    let stations = parse_stations(&to_bytes(&json!([record]))).expect("extra fields ignored");
    assert_eq!(stations.len(), 1);
}

#[test]
fn missing_field_on_one_record_fails_whole_payload() {
    let mut broken = station_json("b", "Pier 1");
    broken.as_object_mut().unwrap().remove("hasKiosk");
    let payload = json!([station_json("a", "Penn Station"), broken]);

    let err = parse_stations(&to_bytes(&payload)).unwrap_err();
    match err {
        FeedError::Format { context, reason } => {
            assert!(context.contains("#1"), "context was {context}");
            assert!(reason.contains("hasKiosk"), "reason was {reason}");
        }
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn null_field_is_a_format_error_not_a_default() {
    let mut broken = station_json("a", "Penn Station");
    broken["description"] = Value::Null;
    let err = parse_stations(&to_bytes(&json!([broken]))).unwrap_err();
    assert!(matches!(err, FeedError::Format { .. }));
}

#[test]
fn wrong_location_arity_is_rejected() {
    let mut broken = station_json("a", "Penn Station");
    broken["location"] = json!([39.3]);
    let err = parse_stations(&to_bytes(&json!([broken]))).unwrap_err();
    assert!(matches!(err, FeedError::Format { .. }));
}

#[test]
fn out_of_range_location_is_rejected() {
    let mut broken = station_json("a", "Penn Station");
    broken["location"] = json!([139.3, -76.6]);
    let err = parse_stations(&to_bytes(&json!([broken]))).unwrap_err();
    assert!(matches!(err, FeedError::Format { ref reason, .. } if reason.contains("WGS84")));
}

#[test]
fn empty_name_is_rejected() {
    let broken = station_json("a", "   ");
    let err = parse_stations(&to_bytes(&json!([broken]))).unwrap_err();
    assert!(matches!(err, FeedError::Format { ref reason, .. } if reason.contains("name")));
}

#[test]
fn non_array_payload_is_rejected() {
    let err = parse_stations(br#"{"stations": []}"#).unwrap_err();
    assert!(matches!(err, FeedError::Format { .. }));

    let err = parse_stations(b"<html>maintenance</html>").unwrap_err();
    assert!(matches!(err, FeedError::Format { .. }));
}

#[test]
fn empty_array_is_valid() {
    assert!(parse_stations(b"[]").unwrap().is_empty());
}

#[test]
fn lenient_parse_isolates_bad_records() {
    let mut broken = station_json("b", "Pier 1");
    broken["hasCardReader"] = json!("yes");
    let payload = json!([station_json("a", "Penn Station"), broken, station_json("c", "Fells Point")]);

    let results = parse_stations_lenient(&to_bytes(&payload)).expect("top-level array is fine");
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().name, "Fells Point");
}

#[test]
fn lenient_parse_still_rejects_non_array_payload() {
    assert!(parse_stations_lenient(b"\"oops\"").is_err());
}
