//! Result-shape dispatch and property assembly for Zillow payloads.
//!
//! A search response carries a list of map results; each entry is either a
//! standard listing with a nested homeInfo block or a multi-unit building.
//! Detail pages carry a single cached property object instead. Every variant
//! is assembled into the same canonical [`Property`] record.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::adapters::zillow::{address, normalize};
use crate::domain::property::{Description, Property, SiteName};
use crate::error::{HarvestError, Result};

/// The two supported map-result layouts.
#[derive(Debug)]
pub enum MapEntryShape<'a> {
    /// Single-family or otherwise standard listing with a homeInfo block.
    Home { home_info: &'a Value },
    /// Multi-unit building advertising a price/size range.
    Building,
}

/// Route one map-result entry to its extraction rule. An entry with neither
/// discriminating key is a schema change, not a missing optional.
pub fn classify_map_entry(entry: &Value) -> Result<MapEntryShape<'_>> {
    if let Some(home_info) = entry.pointer("/hdpData/homeInfo") {
        return Ok(MapEntryShape::Home { home_info });
    }
    if entry.get("isBuilding").is_some() {
        return Ok(MapEntryShape::Building);
    }
    Err(HarvestError::Parse {
        reason: "map result entry has neither a homeInfo block nor a building flag".into(),
    })
}

/// Parse a full map-search response into canonical records.
///
/// Entries are routed independently; a malformed entry is logged and skipped
/// so one bad listing never discards the rest of the page.
pub fn parse_map_results(
    payload: &Value,
    base_url: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Property>> {
    let entries = payload
        .pointer("/cat1/searchResults/mapResults")
        .and_then(Value::as_array)
        .ok_or_else(|| HarvestError::Parse {
            reason: "search response: could not find mapResults array".into(),
        })?;

    let mut properties = Vec::with_capacity(entries.len());
    for entry in entries {
        match parse_map_entry(entry, base_url, now) {
            Ok(property) => properties.push(property),
            Err(error) => warn!(%error, "Skipping malformed map result entry"),
        }
    }

    Ok(properties)
}

pub fn parse_map_entry(entry: &Value, base_url: &str, now: DateTime<Utc>) -> Result<Property> {
    match classify_map_entry(entry)? {
        MapEntryShape::Home { home_info } => parse_home_entry(entry, home_info, base_url, now),
        MapEntryShape::Building => parse_building_entry(entry, base_url, now),
    }
}

fn parse_home_entry(
    entry: &Value,
    home_info: &Value,
    base_url: &str,
    now: DateTime<Utc>,
) -> Result<Property> {
    let mut property = Property::blank(SiteName::Zillow, detail_url(entry, base_url)?);

    let zpid = id_string(home_info.get("zpid"));
    property.property_id = zpid.clone();
    property.listing_id = zpid;
    property.status = home_info
        .get("homeStatus")
        .and_then(Value::as_str)
        .map(String::from);
    property.mls_id = mls_id_from_info(entry);

    let display_price = entry
        .get("price")
        .and_then(Value::as_str)
        .and_then(normalize::clean_price);
    property.list_price = display_price;
    property.list_price_min = display_price;
    property.list_price_max = display_price;

    if let Some(ms) = ms_counter(home_info.get("timeOnZillow")) {
        property.days_on_mls = Some(normalize::days_on_market(ms));
        property.list_date = Some(normalize::list_date(ms, now));
    }

    let living_area = home_info.get("livingArea").and_then(Value::as_f64);
    property.prc_sqft =
        normalize::price_per_sqft(home_info.get("price").and_then(Value::as_f64), living_area);
    property.estimated_value = normalize::estimated_value(home_info);

    property.address = address::parse_entry_address(entry)?;
    property.latitude = entry.pointer("/latLong/latitude").and_then(Value::as_f64);
    property.longitude = entry.pointer("/latLong/longitude").and_then(Value::as_f64);

    let (baths_full, baths_half) =
        normalize::split_baths(home_info.get("bathrooms").and_then(Value::as_f64));
    property.description = Description {
        primary_photo: entry.get("imgSrc").and_then(Value::as_str).map(String::from),
        alt_photos: Vec::new(),
        style: home_info
            .get("homeType")
            .and_then(Value::as_str)
            .map(String::from),
        beds: as_u32(home_info.get("bedrooms")),
        baths_full,
        baths_half: Some(baths_half),
        sqft: as_u32(home_info.get("livingArea")),
        lot_sqft: entry_lot_sqft(entry)?,
        sold_price: None,
        year_built: None,
        garage: None,
        stories: None,
    };

    Ok(property)
}

fn parse_building_entry(entry: &Value, base_url: &str, now: DateTime<Utc>) -> Result<Property> {
    let mut property = Property::blank(SiteName::Zillow, detail_url(entry, base_url)?);

    let plid = id_string(entry.get("plid"));
    property.property_id = plid.clone();
    property.listing_id = plid;
    property.status = entry
        .get("statusType")
        .and_then(Value::as_str)
        .map(String::from);
    property.mls_id = mls_id_from_info(entry);

    let display_price = entry
        .get("price")
        .and_then(Value::as_str)
        .and_then(normalize::clean_price);
    property.list_price = display_price;
    property.list_price_min = display_price;
    property.list_price_max = display_price;

    if let Some(ms) = ms_counter(entry.get("timeOnZillow")) {
        property.days_on_mls = Some(normalize::days_on_market(ms));
        property.list_date = Some(normalize::list_date(ms, now));
    }

    let min_area = entry.get("minArea").and_then(Value::as_f64);
    property.prc_sqft = normalize::price_per_sqft(display_price, min_area);

    property.address = address::parse_entry_address(entry)?;
    property.latitude = entry.pointer("/latLong/latitude").and_then(Value::as_f64);
    property.longitude = entry.pointer("/latLong/longitude").and_then(Value::as_f64);

    let (baths_full, baths_half) =
        normalize::split_baths(entry.get("minBaths").and_then(Value::as_f64));
    property.description = Description {
        primary_photo: entry.get("imgSrc").and_then(Value::as_str).map(String::from),
        alt_photos: Vec::new(),
        style: Some("APARTMENT".into()),
        beds: as_u32(entry.get("minBeds")),
        baths_full,
        baths_half: Some(baths_half),
        sqft: as_u32(entry.get("minArea")),
        lot_sqft: entry_lot_sqft(entry)?,
        sold_price: None,
        year_built: None,
        garage: None,
        stories: None,
    };

    Ok(property)
}

/// Assemble a single cached property from a detail page.
pub fn parse_detail_property(property_data: &Value, base_url: &str) -> Result<Property> {
    let hdp_url = property_data
        .get("hdpUrl")
        .and_then(Value::as_str)
        .ok_or_else(|| HarvestError::Parse {
            reason: "detail property is missing hdpUrl".into(),
        })?;
    let url = if hdp_url.contains("zillow.com") {
        hdp_url.to_string()
    } else {
        format!("{base_url}{hdp_url}")
    };

    let address_data = property_data
        .get("address")
        .ok_or_else(|| HarvestError::Parse {
            reason: "detail property is missing its address block".into(),
        })?;

    let mut property = Property::blank(SiteName::Zillow, url);
    let zpid = id_string(property_data.get("zpid"));
    property.property_id = zpid.clone();
    property.listing_id = zpid;
    property.address = address::from_structured(
        address_data.get("streetAddress").and_then(Value::as_str),
        address_data.get("city").and_then(Value::as_str),
        address_data.get("state").and_then(Value::as_str),
        address_data.get("zipcode").and_then(Value::as_str),
    );
    property.mls_id = property_data
        .pointer("/attributionInfo/mlsId")
        .and_then(Value::as_str)
        .map(String::from);
    property.latitude = property_data.get("latitude").and_then(Value::as_f64);
    property.longitude = property_data.get("longitude").and_then(Value::as_f64);
    property.description.stories = as_u32(property_data.pointer("/resoFacts/stories"));

    Ok(property)
}

fn detail_url(entry: &Value, base_url: &str) -> Result<String> {
    let path = entry
        .get("detailUrl")
        .and_then(Value::as_str)
        .ok_or_else(|| HarvestError::Parse {
            reason: "map result entry is missing detailUrl".into(),
        })?;
    Ok(format!("{base_url}{path}"))
}

/// Site identifiers show up both as JSON numbers and strings.
fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// MLS identifier embedded in the display string `"MLS ID #12345, Broker"`.
fn mls_id_from_info(entry: &Value) -> Option<String> {
    entry
        .get("info1String")
        .and_then(Value::as_str)
        .and_then(|s| s.split_once("MLS ID #"))
        .map(|(_, id)| id.trim().to_string())
}

/// Counters arrive as integer or float milliseconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ms_counter(value: Option<&Value>) -> Option<u64> {
    value.and_then(Value::as_f64).map(|ms| ms.max(0.0) as u64)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_u32(value: Option<&Value>) -> Option<u32> {
    value.and_then(Value::as_f64).map(|v| v.max(0.0) as u32)
}

fn entry_lot_sqft(entry: &Value) -> Result<u64> {
    normalize::lot_sqft(
        entry
            .pointer("/hdpData/homeInfo/lotAreaValue")
            .and_then(Value::as_f64),
        entry
            .pointer("/hdpData/homeInfo/lotAreaUnit")
            .and_then(Value::as_str),
    )
}
