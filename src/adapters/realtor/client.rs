use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::adapters::realtor::parser;
use crate::config::types::RealtorConfig;
use crate::domain::listing_type::ListingType;
use crate::domain::property::{Property, SiteName};
use crate::domain::search_params::SearchParams;
use crate::error::{HarvestError, Result};
use crate::ports::property_source::PropertySource;

/// The search endpoint serves at most 200 rows per query.
const PAGE_SIZE: u64 = 200;
/// Offsets past this point are refused upstream.
const MAX_RESULTS: u64 = 10_000;

const AREA_TYPES: &str = "city,state,county,postal_code,address,street,neighborhood,school,school_district,university,park";

/// Fields every search row carries, shared by the area, radius and by-id
/// query shapes.
const RESULTS_FRAGMENT: &str = "{ count total results { \
    property_id list_date status last_sold_date list_price price_per_sqft \
    description { sqft beds baths_full baths_half lot_sqft sold_price year_built garage type name stories } \
    source { id listing_id } \
    hoa { fee } \
    location { \
        address { street_number street_name street_suffix unit city state_code postal_code coordinate { lon lat } } \
        neighborhoods { name } \
    } } }";

const LISTING_QUERY: &str = "query Listing($listing_id: ID!) { listing(id: $listing_id) { \
    source { id listing_id } \
    address { street_number street_name street_suffix unit city state_code postal_code location { coordinate { lat lon } } } \
    basic { sqft beds baths_full baths_half lot_sqft sold_price type price status sold_date list_date } \
    details { year_built stories garage permalink } } }";

const PROPERTY_QUERY: &str = "query Property($property_id: ID!) { property(id: $property_id) { \
    property_id \
    details { date_updated garage permalink year_built stories } \
    address { street_number street_name street_suffix unit city state_code postal_code location { coordinate { lat lon } } } \
    basic { baths beds price sqft lot_sqft type sold_price } \
    public_record { lot_size sqft stories units year_built } } }";

const LISTINGS_QUERY: &str = "query Property($property_id: ID!) { property(id: $property_id) { \
    listings { listing_id primary } } }";

pub struct RealtorScraper {
    http: Client,
    config: RealtorConfig,
}

impl RealtorScraper {
    pub fn new(config: RealtorConfig) -> std::result::Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs));
        if let Some(ref proxy) = config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let http = builder.build()?;

        Ok(Self { http, config })
    }

    /// Resolve free-text input to a location suggestion; the suggestion's
    /// area type decides which search shape runs.
    async fn locate(&self, params: &SearchParams) -> Result<Value> {
        let client_id = params.listing_type.as_str().replace('_', "-");
        let url = Url::parse_with_params(
            &self.config.autocomplete_url,
            [
                ("input", params.location.as_str()),
                ("client_id", client_id.as_str()),
                ("limit", "1"),
                ("area_types", AREA_TYPES),
            ],
        )?;
        let response = self.http.get(url).send().await?;
        let body: Value = response.json().await?;

        body.get("autocomplete")
            .and_then(Value::as_array)
            .and_then(|suggestions| suggestions.first())
            .cloned()
            .ok_or_else(|| HarvestError::NoResults {
                location: params.location.clone(),
            })
    }

    async fn post_graphql(&self, query: &str, variables: Value) -> Result<Value> {
        debug!(url = %self.config.search_url, "Querying search endpoint");
        let payload = json!({"query": query, "variables": variables});

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(u64::from(attempt) * 2);
                debug!(attempt, delay_secs = delay.as_secs(), "Retrying request");
                tokio::time::sleep(delay).await;
            }

            match self
                .http
                .post(&self.config.search_url)
                .json(&payload)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json().await.map_err(HarvestError::Http);
                    }
                    if status.as_u16() == 429 {
                        warn!("Rate limited by upstream (429)");
                    }
                    last_error = Some(HarvestError::Parse {
                        reason: format!("bad response status code: {status}"),
                    });
                }
                Err(e) => {
                    warn!(error = %e, attempt, "HTTP request failed");
                    last_error = Some(HarvestError::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| HarvestError::Parse {
            reason: "all retries exhausted".into(),
        }))
    }

    /// One page of a search. A null or missing result container means zero
    /// rows, not a failure; malformed rows are logged and skipped.
    async fn search_page(
        &self,
        query: &str,
        search_key: &str,
        variables: &Value,
        offset: u64,
    ) -> Result<(u64, Vec<Property>)> {
        let mut variables = variables.clone();
        variables["offset"] = json!(offset);
        let response = self.post_graphql(query, variables).await?;

        let Some(container) = response
            .pointer(&format!("/data/{search_key}"))
            .filter(|container| !container.is_null())
        else {
            return Ok((0, Vec::new()));
        };
        let total = container.get("total").and_then(Value::as_u64).unwrap_or(0);
        let Some(rows) = container.get("results").and_then(Value::as_array) else {
            return Ok((0, Vec::new()));
        };

        let mut properties = Vec::with_capacity(rows.len());
        for row in rows {
            match parser::parse_search_result(row, &self.config.property_url) {
                Ok(property) => properties.push(property),
                Err(error) => warn!(%error, "Skipping malformed search result"),
            }
        }

        Ok((total, properties))
    }

    async fn paginate(
        &self,
        query: &str,
        search_key: &str,
        variables: &Value,
    ) -> Result<Vec<Property>> {
        let (total, mut properties) = self.search_page(query, search_key, variables, 0).await?;

        let mut offset = PAGE_SIZE;
        while offset < total.min(MAX_RESULTS) {
            let (_, page) = self.search_page(query, search_key, variables, offset).await?;
            properties.extend(page);
            offset += PAGE_SIZE;
        }

        Ok(properties)
    }

    /// A single address with no radius: try the by-id search first, then the
    /// address's latest listing, then its bare property record.
    async fn single_address(&self, location: &Value) -> Result<Vec<Property>> {
        let property_id =
            parser::id_string(location.get("mpr_id")).ok_or_else(|| HarvestError::Parse {
                reason: "location suggestion is missing mpr_id".into(),
            })?;

        let (total, properties) = self
            .search_page(
                &by_id_query(),
                "property_search",
                &json!({"property_id": property_id}),
                0,
            )
            .await?;
        if total > 0 {
            return Ok(properties);
        }

        match self.latest_listing_id(&property_id).await? {
            Some(listing_id) => Ok(vec![self.fetch_listing(&listing_id).await?]),
            None => Ok(vec![self.fetch_property(&property_id).await?]),
        }
    }

    /// The primary listing of an address, or its most recent one.
    async fn latest_listing_id(&self, property_id: &str) -> Result<Option<String>> {
        let response = self
            .post_graphql(LISTINGS_QUERY, json!({"property_id": property_id}))
            .await?;
        let Some(listings) = response
            .pointer("/data/property/listings")
            .and_then(Value::as_array)
        else {
            return Ok(None);
        };

        let chosen = listings
            .iter()
            .find(|listing| {
                listing
                    .get("primary")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
            .or_else(|| listings.first());
        Ok(chosen.and_then(|listing| parser::id_string(listing.get("listing_id"))))
    }

    async fn fetch_listing(&self, listing_id: &str) -> Result<Property> {
        let response = self
            .post_graphql(LISTING_QUERY, json!({"listing_id": listing_id}))
            .await?;
        let info = response
            .pointer("/data/listing")
            .filter(|info| !info.is_null())
            .ok_or_else(|| HarvestError::Parse {
                reason: "listing query returned no data".into(),
            })?;
        parser::parse_listing(info, &self.config.property_url)
    }

    async fn fetch_property(&self, property_id: &str) -> Result<Property> {
        let response = self
            .post_graphql(PROPERTY_QUERY, json!({"property_id": property_id}))
            .await?;
        let info = response
            .pointer("/data/property")
            .filter(|info| !info.is_null())
            .ok_or_else(|| HarvestError::Parse {
                reason: "property query returned no data".into(),
            })?;
        parser::parse_property_record(info, property_id, &self.config.property_url)
    }

    async fn run_search(&self, params: &SearchParams) -> Result<Vec<Property>> {
        let location = self.locate(params).await?;
        let area_type = location
            .get("area_type")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if area_type == "address" {
            if let Some(radius) = params.radius {
                let coordinates = centroid_coordinates(&location)?;
                let variables = json!({
                    "coordinates": coordinates,
                    "radius": format!("{radius}mi"),
                });
                return self
                    .paginate(&comps_query(params), "property_search", &variables)
                    .await;
            }
            return self.single_address(&location).await;
        }

        let variables = json!({
            "city": location.get("city").cloned().unwrap_or(Value::Null),
            "county": location.get("county").cloned().unwrap_or(Value::Null),
            "state_code": location.get("state_code").cloned().unwrap_or(Value::Null),
            "postal_code": location.get("postal_code").cloned().unwrap_or(Value::Null),
        });
        self.paginate(&area_query(params), "home_search", &variables)
            .await
    }
}

#[async_trait]
impl PropertySource for RealtorScraper {
    fn site_name(&self) -> SiteName {
        SiteName::Realtor
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<Property>> {
        params.validate()?;

        let mut properties = self.run_search(params).await?;

        // past_days is already applied server-side via the date filter
        if params.mls_only {
            properties.retain(|p| p.mls.is_some());
        }

        Ok(properties)
    }
}

/// Sold searches window on the sale date, everything else on the list date.
fn date_filter(listing_type: ListingType, past_days: Option<u32>) -> String {
    match past_days {
        None => String::new(),
        Some(days) if listing_type == ListingType::Sold => {
            format!(r#"sold_date: {{ min: "$today-{days}D" }}"#)
        }
        Some(days) => format!(r#"list_date: {{ min: "$today-{days}D" }}"#),
    }
}

fn sort_clause(listing_type: ListingType) -> &'static str {
    if listing_type == ListingType::Sold {
        "sort: [{ field: sold_date, direction: desc }]"
    } else {
        "sort: [{ field: list_date, direction: desc }]"
    }
}

/// Search shape for a general location (city, zip, county, ...).
fn area_query(params: &SearchParams) -> String {
    format!(
        "query Home_search($city: String, $county: [String], $state_code: String, $postal_code: String, $offset: Int) {{ \
            home_search(query: {{ city: $city county: $county postal_code: $postal_code state_code: $state_code status: {status} {date} }} {sort} limit: 200 offset: $offset) {RESULTS_FRAGMENT} }}",
        status = params.listing_type.as_str(),
        date = date_filter(params.listing_type, params.past_days),
        sort = sort_clause(params.listing_type),
    )
}

/// Search shape for a radius around one address.
fn comps_query(params: &SearchParams) -> String {
    format!(
        "query Property_search($coordinates: [Float]!, $radius: String!, $offset: Int!) {{ \
            property_search(query: {{ nearby: {{ coordinates: $coordinates radius: $radius }} status: {status} {date} }} {sort} limit: 200 offset: $offset) {RESULTS_FRAGMENT} }}",
        status = params.listing_type.as_str(),
        date = date_filter(params.listing_type, params.past_days),
        sort = sort_clause(params.listing_type),
    )
}

/// Search shape for one known property id.
fn by_id_query() -> String {
    format!(
        "query Property_search($property_id: [ID]!, $offset: Int!) {{ \
            property_search(query: {{ property_id: $property_id }} limit: 1 offset: $offset) {RESULTS_FRAGMENT} }}"
    )
}

/// The suggestion centroid arrives as `{lon, lat}`; the query wants it in
/// that order too.
fn centroid_coordinates(location: &Value) -> Result<[f64; 2]> {
    let lon = location.pointer("/centroid/lon").and_then(Value::as_f64);
    let lat = location.pointer("/centroid/lat").and_then(Value::as_f64);
    match (lon, lat) {
        (Some(lon), Some(lat)) => Ok([lon, lat]),
        _ => Err(HarvestError::Parse {
            reason: "location suggestion is missing its centroid".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_filter_windows_on_the_right_field() {
        assert_eq!(date_filter(ListingType::ForSale, None), "");
        assert_eq!(
            date_filter(ListingType::ForSale, Some(30)),
            r#"list_date: { min: "$today-30D" }"#
        );
        assert_eq!(
            date_filter(ListingType::Sold, Some(90)),
            r#"sold_date: { min: "$today-90D" }"#
        );
    }

    #[test]
    fn sort_clause_follows_listing_type() {
        assert!(sort_clause(ListingType::Sold).contains("sold_date"));
        assert!(sort_clause(ListingType::ForRent).contains("list_date"));
    }

    #[test]
    fn area_query_embeds_status_and_window() {
        let mut params = SearchParams::new("Dallas, TX", ListingType::Sold);
        params.past_days = Some(30);
        let query = area_query(&params);
        assert!(query.contains("home_search"));
        assert!(query.contains("status: sold"));
        assert!(query.contains(r#"sold_date: { min: "$today-30D" }"#));
        assert!(query.contains("property_id"));
    }

    #[test]
    fn comps_query_searches_nearby() {
        let params = SearchParams::new("2530 Al Lipscomb Way", ListingType::ForSale);
        let query = comps_query(&params);
        assert!(query.contains("property_search"));
        assert!(query.contains("nearby"));
        assert!(query.contains("$radius"));
    }

    #[test]
    fn by_id_query_is_limited_to_one_row() {
        let query = by_id_query();
        assert!(query.contains("property_id: $property_id"));
        assert!(query.contains("limit: 1"));
    }

    #[test]
    fn centroid_is_lon_lat_ordered() {
        let location = serde_json::json!({"centroid": {"lon": -96.79, "lat": 32.77}});
        let coordinates = centroid_coordinates(&location).unwrap();
        assert!((coordinates[0] - -96.79).abs() < f64::EPSILON);
        assert!((coordinates[1] - 32.77).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_centroid_is_parse_failure() {
        let location = serde_json::json!({"area_type": "address"});
        assert!(centroid_coordinates(&location).is_err());
    }
}
