//! Field-level normalizers: lot-size units, time-on-market counters, price
//! strings and bath counts arrive in site-specific encodings and leave here
//! in canonical form.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::error::{HarvestError, Result};

pub const SQFT_PER_ACRE: f64 = 43_560.0;

const MS_PER_DAY: u64 = 86_400_000;

/// Drop every character that is not a digit, `-` or `.`.
pub fn strip_currency(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect()
}

/// Numeric price from a display string like `"$1,250,000"` or `"$1,500+/mo"`.
pub fn clean_price(raw: &str) -> Option<f64> {
    let stripped = strip_currency(raw);
    stripped.parse().ok()
}

/// Lot area normalized to square feet.
///
/// Absent fields are the deliberate "no lot" `0` sentinel; an unrecognized
/// unit label is a hard failure naming the unit.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn lot_sqft(area: Option<f64>, unit: Option<&str>) -> Result<u64> {
    let (Some(area), Some(unit)) = (area, unit) else {
        return Ok(0);
    };
    match unit {
        "sqft" => Ok(area.round() as u64),
        "acres" => Ok((area * SQFT_PER_ACRE).round() as u64),
        other => Err(HarvestError::UnknownLotUnit {
            unit: other.to_string(),
        }),
    }
}

/// Whole days on market, truncating toward zero.
#[allow(clippy::cast_possible_truncation)]
pub fn days_on_market(time_on_market_ms: u64) -> u32 {
    (time_on_market_ms / MS_PER_DAY) as u32
}

/// Absolute listing date derived from the same millisecond counter as
/// [`days_on_market`], so the two always agree to within a day. `now` is
/// injected so golden-output tests can pin the clock.
#[allow(clippy::cast_possible_wrap)]
pub fn list_date(time_on_market_ms: u64, now: DateTime<Utc>) -> String {
    let posted = now - TimeDelta::milliseconds(time_on_market_ms as i64);
    posted.format("%Y-%m-%d").to_string()
}

/// Integer price-per-square-foot; null whenever the living area is unknown
/// or zero, so the division can never blow up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn price_per_sqft(price: Option<f64>, sqft: Option<f64>) -> Option<u32> {
    match (price, sqft) {
        (Some(price), Some(sqft)) if sqft > 0.0 => Some((price / sqft) as u32),
        _ => None,
    }
}

/// Split a raw fractional bath count into full and half baths. A half bath
/// is synthesized only when the fractional part is exactly 0.5.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn split_baths(raw: Option<f64>) -> (Option<u32>, u32) {
    let Some(raw) = raw else {
        return (None, 0);
    };
    let half = u32::from((raw.fract() - 0.5).abs() < f64::EPSILON);
    (Some(raw.trunc() as u32), half)
}

/// Cross-read value estimate: rental listings surface the sale estimate,
/// sale and sold listings the rent estimate.
pub fn estimated_value(home_info: &Value) -> Option<f64> {
    let status = home_info
        .get("homeStatus")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let key = if status == "FOR_RENT" {
        "zestimate"
    } else {
        "rentZestimate"
    };
    home_info.get(key).and_then(Value::as_f64)
}
