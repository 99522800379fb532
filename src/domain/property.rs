use serde::{Deserialize, Serialize};

/// Upstream site a record was harvested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteName {
    #[serde(rename = "realtor.com")]
    Realtor,
    #[serde(rename = "zillow")]
    Zillow,
}

impl SiteName {
    pub fn as_str(self) -> &'static str {
        match self {
            SiteName::Realtor => "realtor.com",
            SiteName::Zillow => "zillow",
        }
    }

    pub fn parse(raw: &str) -> crate::error::Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "realtor.com" | "realtor" => Ok(SiteName::Realtor),
            "zillow" => Ok(SiteName::Zillow),
            other => Err(crate::error::HarvestError::InvalidParams {
                reason: format!("unknown site: {other} (expected realtor.com or zillow)"),
            }),
        }
    }
}

impl std::fmt::Display for SiteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postal address with the sub-unit split out of the street text.
///
/// `unit` is only populated when one of the recognized unit designators
/// (" APT ", " UNIT ", " #") appeared inside the raw street string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub unit: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut wrote = false;
        if let Some(ref street) = self.street {
            write!(f, "{street}")?;
            wrote = true;
        }
        if let Some(ref unit) = self.unit {
            if wrote {
                write!(f, " ")?;
            }
            write!(f, "#{unit}")?;
            wrote = true;
        }
        if let Some(ref city) = self.city {
            if wrote {
                write!(f, ", ")?;
            }
            write!(f, "{city}")?;
            wrote = true;
        }
        if let Some(ref state) = self.state {
            if wrote {
                write!(f, ", ")?;
            }
            write!(f, "{state}")?;
        }
        if let Some(ref zip) = self.zip {
            write!(f, " {zip}")?;
        }
        Ok(())
    }
}

/// Structural description of the home itself.
///
/// `lot_sqft` is always square feet; `0` is the "no lot data" sentinel, kept
/// distinct from a failed unit conversion (which is a hard error upstream).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub primary_photo: Option<String>,
    #[serde(default)]
    pub alt_photos: Vec<String>,
    pub style: Option<String>,
    pub beds: Option<u32>,
    pub baths_full: Option<u32>,
    pub baths_half: Option<u32>,
    pub sqft: Option<u32>,
    pub lot_sqft: u64,
    pub sold_price: Option<f64>,
    pub year_built: Option<u32>,
    pub garage: Option<u32>,
    pub stories: Option<u32>,
}

/// Canonical listing record every upstream shape is normalized into.
///
/// All shape variants produce a structurally identical record: fields the
/// variant cannot derive are explicit `None`, never omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub site_name: SiteName,
    pub property_id: Option<String>,
    pub listing_id: Option<String>,
    pub property_url: String,
    pub status: Option<String>,
    pub mls: Option<String>,
    pub mls_id: Option<String>,
    pub address: Address,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub list_price: Option<f64>,
    pub list_price_min: Option<f64>,
    pub list_price_max: Option<f64>,
    pub prc_sqft: Option<u32>,
    pub estimated_value: Option<f64>,
    pub assessed_value: Option<f64>,
    pub list_date: Option<String>,
    pub days_on_mls: Option<u32>,
    pub last_sold_date: Option<String>,
    pub description: Description,
    pub neighborhoods: Option<String>,
    pub county: Option<String>,
    pub fips_code: Option<String>,
    pub nearby_schools: Option<String>,
    pub advertisers: Option<String>,
    pub new_construction: Option<bool>,
    pub hoa_fee: Option<f64>,
}

impl Property {
    /// Blank record for one site; assemblers fill in what their shape
    /// variant can derive and leave the rest null.
    pub fn blank(site_name: SiteName, property_url: String) -> Self {
        Self {
            site_name,
            property_id: None,
            listing_id: None,
            property_url,
            status: None,
            mls: None,
            mls_id: None,
            address: Address::default(),
            latitude: None,
            longitude: None,
            list_price: None,
            list_price_min: None,
            list_price_max: None,
            prc_sqft: None,
            estimated_value: None,
            assessed_value: None,
            list_date: None,
            days_on_mls: None,
            last_sold_date: None,
            description: Description::default(),
            neighborhoods: None,
            county: None,
            fips_code: None,
            nearby_schools: None,
            advertisers: None,
            new_construction: None,
            hoa_fee: None,
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.site_name, self.address)?;
        if let Some(price) = self.list_price {
            write!(f, " (${price:.0}")?;
            if let Some(prc) = self.prc_sqft {
                write!(f, ", ${prc}/sqft")?;
            }
            write!(f, ")")?;
        }
        if let Some(ref status) = self.status {
            write!(f, " | {status}")?;
        }
        if let Some(days) = self.days_on_mls {
            write!(f, " | {days} days on market")?;
        }
        Ok(())
    }
}
