//! Property assembly for realtor.com GraphQL payloads.
//!
//! The search endpoint returns structured rows, so unlike the Zillow side
//! there is no free-text address or display-price stripping here; fields map
//! almost one-to-one onto the canonical [`Property`] record.

use serde_json::Value;

use crate::domain::property::{Address, Description, Property, SiteName};
use crate::error::{HarvestError, Result};

/// Assemble one row of a `home_search`/`property_search` result set.
pub fn parse_search_result(result: &Value, property_url: &str) -> Result<Property> {
    let property_id =
        id_string(result.get("property_id")).ok_or_else(|| HarvestError::Parse {
            reason: "search result is missing property_id".into(),
        })?;

    let mut property = Property::blank(
        SiteName::Realtor,
        format!("{property_url}{property_id}"),
    );
    property.property_id = Some(property_id);
    property.mls = result.pointer("/source/id").and_then(Value::as_str).map(String::from);
    property.mls_id = id_string(result.pointer("/source/listing_id"));
    property.listing_id = property.mls_id.clone();
    property.status = result
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_uppercase);
    property.list_price = result.get("list_price").and_then(Value::as_f64);
    property.list_date = date_only(result.get("list_date"));
    property.prc_sqft = as_u32(result.get("price_per_sqft"));
    property.last_sold_date = date_only(result.get("last_sold_date"));
    property.hoa_fee = result.pointer("/hoa/fee").and_then(Value::as_f64);

    let coordinate = result.pointer("/location/address/coordinate");
    property.latitude = coordinate.and_then(|c| c.get("lat")).and_then(Value::as_f64);
    property.longitude = coordinate.and_then(|c| c.get("lon")).and_then(Value::as_f64);

    property.address = parse_address(result.pointer("/location/address"));
    property.neighborhoods = parse_neighborhoods(result.pointer("/location/neighborhoods"));
    property.description = parse_description(result.get("description"));

    Ok(property)
}

/// Assemble the single record of a `Listing` query (an address that resolved
/// to an active listing rather than a search row).
pub fn parse_listing(info: &Value, property_url: &str) -> Result<Property> {
    let permalink = info
        .pointer("/details/permalink")
        .and_then(Value::as_str)
        .ok_or_else(|| HarvestError::Parse {
            reason: "listing is missing its permalink".into(),
        })?;

    let mut property = Property::blank(SiteName::Realtor, format!("{property_url}{permalink}"));
    property.mls = info.pointer("/source/id").and_then(Value::as_str).map(String::from);
    property.mls_id = id_string(info.pointer("/source/listing_id"));
    property.listing_id = property.mls_id.clone();

    let basic = info.get("basic").unwrap_or(&Value::Null);
    property.status = basic
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_uppercase);
    property.list_price = basic.get("price").and_then(Value::as_f64);
    property.list_date = date_only(basic.get("list_date"));
    property.last_sold_date = date_only(basic.get("sold_date"));
    property.prc_sqft = guarded_prc_sqft(
        basic.get("price").and_then(Value::as_f64),
        basic.get("sqft").and_then(Value::as_f64),
    );

    let coordinate = info.pointer("/address/location/coordinate");
    property.latitude = coordinate.and_then(|c| c.get("lat")).and_then(Value::as_f64);
    property.longitude = coordinate.and_then(|c| c.get("lon")).and_then(Value::as_f64);

    property.address = parse_address(info.get("address"));
    property.description = Description {
        style: basic
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_uppercase),
        beds: as_u32(basic.get("beds")),
        baths_full: as_u32(basic.get("baths_full")),
        baths_half: as_u32(basic.get("baths_half")),
        sqft: as_u32(basic.get("sqft")),
        lot_sqft: basic.get("lot_sqft").and_then(Value::as_u64).unwrap_or(0),
        sold_price: basic.get("sold_price").and_then(Value::as_f64),
        year_built: as_u32(info.pointer("/details/year_built")),
        garage: as_u32(info.pointer("/details/garage")),
        stories: as_u32(info.pointer("/details/stories")),
        ..Description::default()
    };

    Ok(property)
}

/// Assemble the single record of a `Property` query (an address with no
/// listing history at all).
pub fn parse_property_record(
    info: &Value,
    property_id: &str,
    property_url: &str,
) -> Result<Property> {
    let permalink = info
        .pointer("/details/permalink")
        .and_then(Value::as_str)
        .ok_or_else(|| HarvestError::Parse {
            reason: "property record is missing its permalink".into(),
        })?;

    let mut property = Property::blank(SiteName::Realtor, format!("{property_url}{permalink}"));
    property.property_id = Some(property_id.to_string());
    property.mls_id = Some(property_id.to_string());
    property.address = parse_address(info.get("address"));

    let basic = info.get("basic").unwrap_or(&Value::Null);
    property.list_price = basic.get("price").and_then(Value::as_f64);
    property.description = Description {
        style: basic
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_uppercase),
        beds: as_u32(basic.get("beds")),
        sqft: as_u32(basic.get("sqft")),
        lot_sqft: basic.get("lot_sqft").and_then(Value::as_u64).unwrap_or(0),
        sold_price: basic.get("sold_price").and_then(Value::as_f64),
        year_built: as_u32(info.pointer("/details/year_built")),
        garage: as_u32(info.pointer("/details/garage")),
        stories: as_u32(info.pointer("/details/stories")),
        ..Description::default()
    };

    Ok(property)
}

/// The site delivers the street pre-split; rejoin only the parts it filled.
fn parse_address(data: Option<&Value>) -> Address {
    let Some(data) = data else {
        return Address::default();
    };

    let street_parts: Vec<String> = ["street_number", "street_name", "street_suffix"]
        .iter()
        .filter_map(|key| id_string(data.get(*key)))
        .collect();

    Address {
        street: (!street_parts.is_empty()).then(|| street_parts.join(" ")),
        unit: data.get("unit").and_then(Value::as_str).map(String::from),
        city: data.get("city").and_then(Value::as_str).map(String::from),
        state: data
            .get("state_code")
            .and_then(Value::as_str)
            .map(String::from),
        zip: data
            .get("postal_code")
            .and_then(Value::as_str)
            .map(String::from),
    }
}

fn parse_description(data: Option<&Value>) -> Description {
    let Some(data) = data else {
        return Description::default();
    };
    Description {
        style: data
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_uppercase),
        beds: as_u32(data.get("beds")),
        baths_full: as_u32(data.get("baths_full")),
        baths_half: as_u32(data.get("baths_half")),
        sqft: as_u32(data.get("sqft")),
        lot_sqft: data.get("lot_sqft").and_then(Value::as_u64).unwrap_or(0),
        sold_price: data.get("sold_price").and_then(Value::as_f64),
        year_built: as_u32(data.get("year_built")),
        garage: as_u32(data.get("garage")),
        stories: as_u32(data.get("stories")),
        ..Description::default()
    }
}

fn parse_neighborhoods(data: Option<&Value>) -> Option<String> {
    let names: Vec<&str> = data?
        .as_array()?
        .iter()
        .filter_map(|n| n.get("name").and_then(Value::as_str))
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

/// Timestamps arrive as `"2024-03-01T00:00:00Z"`; only the date part is kept.
fn date_only(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(|s| {
        match s.split_once('T') {
            Some((date, _)) => date,
            None => s,
        }
        .to_string()
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn guarded_prc_sqft(price: Option<f64>, sqft: Option<f64>) -> Option<u32> {
    match (price, sqft) {
        (Some(price), Some(sqft)) if sqft > 0.0 => Some((price / sqft) as u32),
        _ => None,
    }
}

/// Identifiers show up both as JSON numbers and strings.
pub(crate) fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_u32(value: Option<&Value>) -> Option<u32> {
    value.and_then(Value::as_f64).map(|v| v.max(0.0) as u32)
}
