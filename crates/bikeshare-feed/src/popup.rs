//! Bike/dock count extraction from the feed's `popup` HTML fragment.
//!
//! The upstream renders each count as the bold text inside a marker span:
//!
//! ```html
//! <span class="station-bikes"><b>4</b> bikes</span>
//! <span class="station-docks"><b>11</b> docks</span>
//! ```
//!
//! Only these two markers are read; everything else in the fragment is
//! presentation and changes without notice.

use std::sync::LazyLock;

use bikeshare_core::StationCounts;
use regex::Regex;

use crate::error::FeedError;

static BIKES_SPAN: LazyLock<Regex> = LazyLock::new(|| marker_span("station-bikes"));
static DOCKS_SPAN: LazyLock<Regex> = LazyLock::new(|| marker_span("station-docks"));
static BOLD_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<b\b[^>]*>(.*?)</b>").expect("valid bold regex"));

fn marker_span(class: &str) -> Regex {
    let pattern = format!(
        r#"(?is)<span\b[^>]*\bclass\s*=\s*["'](?:[^"']*\s)?{class}(?:\s[^"']*)?["'][^>]*>(.*?)</span>"#
    );
    Regex::new(&pattern).expect("valid marker regex")
}

/// Extract bike and dock counts from a popup fragment.
///
/// # Errors
///
/// Returns [`FeedError::Format`] if either marker span is missing, has no
/// `<b>` element, or its bold text is not a non-negative integer.
pub fn extract_counts(popup: &str) -> Result<StationCounts, FeedError> {
    let bikes = marker_value(popup, &BIKES_SPAN, "station-bikes")?;
    let docks = marker_value(popup, &DOCKS_SPAN, "station-docks")?;
    Ok(StationCounts { bikes, docks })
}

fn marker_value(popup: &str, span: &Regex, marker: &str) -> Result<u32, FeedError> {
    let inner = span
        .captures(popup)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| FeedError::format("popup", format!("missing span.{marker}")))?;

    let text = BOLD_TEXT
        .captures(inner)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| FeedError::format("popup", format!("missing <b> inside span.{marker}")))?;

    text.parse::<u32>().map_err(|e| {
        FeedError::format(
            "popup",
            format!("span.{marker} value {text:?} is not a count: {e}"),
        )
    })
}
