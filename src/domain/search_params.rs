use crate::domain::listing_type::ListingType;
use crate::domain::property::SiteName;
use crate::error::{HarvestError, Result};

/// Read-only input to a scrape run, constructed upstream of the pipeline.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub location: String,
    /// Which upstream site to harvest; realtor.com unless asked otherwise.
    pub site_name: SiteName,
    pub listing_type: ListingType,
    /// Restrict to listings carrying an MLS identifier.
    pub mls_only: bool,
    /// Only listings that entered the market within the last N days.
    pub past_days: Option<u32>,
    /// Properties within N miles of a single address (realtor.com only).
    pub radius: Option<f64>,
}

impl SearchParams {
    pub fn new(location: impl Into<String>, listing_type: ListingType) -> Self {
        Self {
            location: location.into(),
            site_name: SiteName::Realtor,
            listing_type,
            mls_only: false,
            past_days: None,
            radius: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.location.trim().is_empty() {
            return Err(HarvestError::InvalidParams {
                reason: "location is required".into(),
            });
        }
        if let Some(days) = self.past_days
            && days == 0
        {
            return Err(HarvestError::InvalidParams {
                reason: "past_days must be at least 1".into(),
            });
        }
        if let Some(radius) = self.radius
            && radius <= 0.0
        {
            return Err(HarvestError::InvalidParams {
                reason: "radius must be positive".into(),
            });
        }
        Ok(())
    }
}
