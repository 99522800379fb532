//! Batch aggregation into one table with a fixed, documented column order.

use std::io::Write;

use crate::domain::property::Property;
use crate::error::Result;

/// Column order of the materialized table. Every record fills every column;
/// a null field becomes an empty cell, never a missing one.
pub const ORDERED_COLUMNS: [&str; 42] = [
    "site_name",
    "property_url",
    "property_id",
    "listing_id",
    "mls",
    "mls_id",
    "status",
    "style",
    "street",
    "unit",
    "city",
    "state",
    "zip",
    "beds",
    "baths_full",
    "baths_half",
    "sqft",
    "lot_sqft",
    "list_price",
    "list_price_min",
    "list_price_max",
    "prc_sqft",
    "estimated_value",
    "assessed_value",
    "sold_price",
    "year_built",
    "garage",
    "stories",
    "list_date",
    "days_on_mls",
    "last_sold_date",
    "latitude",
    "longitude",
    "primary_photo",
    "alt_photos",
    "neighborhoods",
    "county",
    "fips_code",
    "nearby_schools",
    "advertisers",
    "new_construction",
    "hoa_fee",
];

/// Canonical records merged across sources, ready for materialization.
#[derive(Debug, Default)]
pub struct PropertyTable {
    properties: Vec<Property>,
}

impl PropertyTable {
    /// Concatenate per-source record lists, preserving source order for
    /// reproducibility.
    pub fn from_sources(sources: Vec<Vec<Property>>) -> Self {
        Self {
            properties: sources.into_iter().flatten().collect(),
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(ORDERED_COLUMNS)?;
        for property in &self.properties {
            csv_writer.write_record(row(property))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

fn row(p: &Property) -> Vec<String> {
    let d = &p.description;
    vec![
        p.site_name.to_string(),
        p.property_url.clone(),
        cell_str(&p.property_id),
        cell_str(&p.listing_id),
        cell_str(&p.mls),
        cell_str(&p.mls_id),
        cell_str(&p.status),
        cell_str(&d.style),
        cell_str(&p.address.street),
        cell_str(&p.address.unit),
        cell_str(&p.address.city),
        cell_str(&p.address.state),
        cell_str(&p.address.zip),
        cell(d.beds),
        cell(d.baths_full),
        cell(d.baths_half),
        cell(d.sqft),
        d.lot_sqft.to_string(),
        cell(p.list_price),
        cell(p.list_price_min),
        cell(p.list_price_max),
        cell(p.prc_sqft),
        cell(p.estimated_value),
        cell(p.assessed_value),
        cell(d.sold_price),
        cell(d.year_built),
        cell(d.garage),
        cell(d.stories),
        cell_str(&p.list_date),
        cell(p.days_on_mls),
        cell_str(&p.last_sold_date),
        cell(p.latitude),
        cell(p.longitude),
        cell_str(&d.primary_photo),
        d.alt_photos.join(";"),
        cell_str(&p.neighborhoods),
        cell_str(&p.county),
        cell_str(&p.fips_code),
        cell_str(&p.nearby_schools),
        cell_str(&p.advertisers),
        cell(p.new_construction),
        cell(p.hoa_fee),
    ]
}

fn cell<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn cell_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
