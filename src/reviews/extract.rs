//! Field extraction for JSON review pages
//!
//! Each of the six fields is extracted independently: a missing key or a
//! wrong type defaults that one field to the empty string and leaves the
//! rest intact. Only a body that cannot be parsed at all, or one without a
//! `results` array, fails the page.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::ReviewRecord;

/// Extract the records from one review page body.
///
/// Entries are consumed until the array ends or a `null` entry appears.
/// The API pads short pages with nulls, so a null is an early-termination
/// sentinel, not an error — whatever follows it is discarded.
pub fn extract(body: &str) -> Result<Vec<ReviewRecord>> {
    let page: Value = serde_json::from_str(body)?;
    let results = page
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Extract("page has no results array".to_owned()))?;

    let mut records = Vec::new();
    for entry in results {
        if entry.is_null() {
            break;
        }
        records.push(ReviewRecord {
            title: nested_text(entry, "game", "name"),
            deck: text(entry, "deck"),
            date: text(entry, "publish_date"),
            reviewer: text(entry, "reviewer"),
            score: scalar(entry, "score"),
            url: text(entry, "site_detail_url"),
        });
    }
    Ok(records)
}

/// Read the catalog-wide total from the probe page.
pub fn total_results(body: &str) -> Result<u64> {
    let page: Value = serde_json::from_str(body)?;
    page.get("number_of_total_results")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::Probe("probe page has no number_of_total_results".to_owned()))
}

fn text(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn nested_text(entry: &Value, outer: &str, inner: &str) -> String {
    entry
        .get(outer)
        .and_then(|value| value.get(inner))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Scores arrive as numbers or strings depending on the review era; both
/// render to text, anything else defaults to empty.
fn scalar(entry: &Value, key: &str) -> String {
    match entry.get(key) {
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    }
}
