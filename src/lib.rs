pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod ports;

#[cfg(test)]
pub mod test_helpers;

use crate::adapters::realtor::RealtorScraper;
use crate::adapters::zillow::ZillowScraper;
use crate::config::types::Config;
use crate::domain::property::SiteName;
use crate::domain::search_params::SearchParams;
use crate::error::{HarvestError, Result};
use crate::output::table::PropertyTable;
use crate::ports::property_source::PropertySource;

/// Run a full scrape: validate the query, harvest the selected site and
/// merge the results into one table.
///
/// An empty merged result set is the distinct [`HarvestError::NoResults`]
/// outcome, not a parse failure.
pub async fn scrape_properties(params: &SearchParams, config: &Config) -> Result<PropertyTable> {
    params.validate()?;

    let source: Box<dyn PropertySource> = match params.site_name {
        SiteName::Realtor => Box::new(RealtorScraper::new(config.realtor.clone())?),
        SiteName::Zillow => Box::new(ZillowScraper::new(config.zillow.clone())?),
    };
    let records = source.search(params).await?;

    let table = PropertyTable::from_sources(vec![records]);
    if table.is_empty() {
        return Err(HarvestError::NoResults {
            location: params.location.clone(),
        });
    }
    Ok(table)
}
