use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};

/// Listing category a search is scoped to. Selects both the upstream search
/// filter and the estimated-value cross-read policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    ForSale,
    ForRent,
    Sold,
}

impl ListingType {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "for_sale" => Ok(ListingType::ForSale),
            "for_rent" => Ok(ListingType::ForRent),
            "sold" => Ok(ListingType::Sold),
            other => Err(HarvestError::InvalidParams {
                reason: format!("unknown listing type '{other}', expected for_sale, for_rent or sold"),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListingType::ForSale => "for_sale",
            ListingType::ForRent => "for_rent",
            ListingType::Sold => "sold",
        }
    }
}

impl std::str::FromStr for ListingType {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self> {
        ListingType::parse(s)
    }
}

impl std::fmt::Display for ListingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
