//! Address extraction: structured homeInfo sub-fields when present, otherwise
//! a single `"street, city, state zip"` string. Both modes share the
//! unit-designator split.

use serde_json::Value;

use crate::domain::property::Address;
use crate::error::{HarvestError, Result};

/// Checked in priority order; first match wins.
const UNIT_DESIGNATORS: [&str; 3] = [" APT ", " UNIT ", " #"];

/// Parse a map-result entry's address, picking structured or free-text mode
/// by whether the homeInfo block is present.
pub fn parse_entry_address(entry: &Value) -> Result<Address> {
    if let Some(home_info) = entry.pointer("/hdpData/homeInfo") {
        return Ok(from_structured(
            home_info.get("streetAddress").and_then(Value::as_str),
            home_info.get("city").and_then(Value::as_str),
            home_info.get("state").and_then(Value::as_str),
            home_info.get("zipcode").and_then(Value::as_str),
        ));
    }

    let raw = entry
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| HarvestError::Parse {
            reason: "map result entry has neither a homeInfo block nor an address string".into(),
        })?;
    parse_free_text(raw)
}

/// Structured mode: named sub-fields, then the common unit split.
pub fn from_structured(
    street: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    zip: Option<&str>,
) -> Address {
    let (street, unit) = split_unit(street);
    Address {
        street,
        unit,
        city: city.map(String::from),
        state: state.map(String::from),
        zip: zip.map(String::from),
    }
}

/// Free-text mode: `"street, city, state zip"`. The street is everything up
/// to the first comma, spaced or not. State alone, with no zip, is a valid
/// degenerate tail. Anything without the comma structure is a hard failure,
/// not a partial parse.
pub fn parse_free_text(raw: &str) -> Result<Address> {
    let (street, remainder) = raw.split_once(',').ok_or_else(|| malformed(raw))?;
    let street = street.trim_end();
    let (city, tail) = remainder
        .trim_start()
        .split_once(", ")
        .ok_or_else(|| malformed(raw))?;

    let (state, zip) = match tail.split_once(' ') {
        Some((state, zip)) => (state.to_string(), Some(zip.to_string())),
        None => (tail.to_string(), None),
    };

    let (street, unit) = split_unit(Some(street));
    Ok(Address {
        street,
        unit,
        city: Some(city.to_string()),
        state: Some(state),
        zip,
    })
}

fn malformed(raw: &str) -> HarvestError {
    HarvestError::MalformedAddress {
        raw: raw.to_string(),
    }
}

/// Split a sub-unit identifier out of the street text. Everything after the
/// designator becomes the unit; the designator and trailing text are removed
/// from the street.
fn split_unit(street: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(street) = street else {
        return (None, None);
    };

    for designator in UNIT_DESIGNATORS {
        if let Some(idx) = street.find(designator) {
            let unit = street[idx + designator.len()..].trim();
            let cleaned = street[..idx].trim();
            let unit = (!unit.is_empty()).then(|| unit.to_string());
            return (Some(cleaned.to_string()), unit);
        }
    }

    (Some(street.to_string()), None)
}
