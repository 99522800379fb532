use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::adapters::zillow::parser;
use crate::config::types::ZillowConfig;
use crate::domain::listing_type::ListingType;
use crate::domain::property::{Property, SiteName};
use crate::domain::search_params::SearchParams;
use crate::error::{HarvestError, Result};
use crate::ports::property_source::PropertySource;

/// Map viewport bounds embedded in the search page, echoed back to the
/// backend search endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MapBounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

pub struct ZillowScraper {
    http: Client,
    config: ZillowConfig,
}

impl ZillowScraper {
    pub fn new(config: ZillowConfig) -> std::result::Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(browser_headers())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .cookie_store(true);
        if let Some(ref proxy) = config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let http = builder.build()?;

        Ok(Self { http, config })
    }

    /// Black-box plausibility check against the autocomplete endpoint: a
    /// location nobody can autocomplete will not return listings either.
    async fn is_plausible_location(&self, location: &str) -> Result<bool> {
        let url = Url::parse_with_params(
            &self.config.autocomplete_url,
            [("q", location), ("clientId", "homepage-render")],
        )?;
        let response = self.http.get(url).send().await?;
        let body: Value = response.json().await?;
        Ok(body
            .get("results")
            .and_then(Value::as_array)
            .is_some_and(|results| !results.is_empty()))
    }

    fn search_url(&self, params: &SearchParams) -> String {
        let path = match params.listing_type {
            ListingType::ForSale => "for_sale",
            ListingType::ForRent => "for_rent",
            ListingType::Sold => "recently_sold",
        };
        format!(
            "{}/homes/{}/{}_rb/",
            self.config.base_url, path, params.location
        )
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "Fetching page");

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(u64::from(attempt) * 2);
                debug!(attempt, delay_secs = delay.as_secs(), "Retrying request");
                tokio::time::sleep(delay).await;
            }

            match self.http.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.text().await.map_err(HarvestError::Http);
                    }
                    if status.as_u16() == 429 {
                        warn!("Rate limited by upstream (429)");
                    }
                    last_error = Some(HarvestError::Parse {
                        reason: format!("bad response status code: {status} for {url}"),
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

    async fn put_json(&self, url: &str, payload: &Value) -> Result<Value> {
        debug!(url, "Querying backend search endpoint");

        let response = self.http.put(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Parse {
                reason: format!("bad response status code: {status} for {url}"),
            });
        }
        response.json().await.map_err(HarvestError::Http)
    }

    async fn run_search(&self, params: &SearchParams) -> Result<Vec<Property>> {
        let html = self.fetch_text(&self.search_url(params)).await?;

        let next_data = extract_next_data(&html).ok_or_else(|| HarvestError::NoResults {
            location: params.location.clone(),
        })?;
        let page_props =
            next_data
                .pointer("/props/pageProps")
                .ok_or_else(|| HarvestError::Parse {
                    reason: "page data is missing props.pageProps".into(),
                })?;

        if page_props.get("searchPageState").is_some() {
            let bounds = extract_map_bounds(&html).ok_or_else(|| HarvestError::Parse {
                reason: "map bounds could not be located in the search page".into(),
            })?;
            let payload = search_page_state_payload(&bounds, params.listing_type);
            let url = format!("{}/async-create-search-page-state", self.config.base_url);
            let response = self.put_json(&url, &payload).await?;
            return parser::parse_map_results(&response, &self.config.base_url, Utc::now());
        }

        if let Some(cache) = page_props.get("gdpClientCache").and_then(Value::as_str) {
            // The detail cache is a JSON document nested inside a JSON string
            let cache: Value = serde_json::from_str(cache)?;
            let property_data = cache
                .as_object()
                .and_then(|entries| entries.values().find_map(|entry| entry.get("property")))
                .ok_or_else(|| HarvestError::Parse {
                    reason: "detail cache contains no property object".into(),
                })?;
            return Ok(vec![parser::parse_detail_property(
                property_data,
                &self.config.base_url,
            )?]);
        }

        Err(HarvestError::NoResults {
            location: params.location.clone(),
        })
    }
}

#[async_trait]
impl PropertySource for ZillowScraper {
    fn site_name(&self) -> SiteName {
        SiteName::Zillow
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<Property>> {
        params.validate()?;

        if !self.is_plausible_location(&params.location).await? {
            return Err(HarvestError::NoResults {
                location: params.location.clone(),
            });
        }

        let mut properties = self.run_search(params).await?;

        if params.mls_only {
            properties.retain(|p| p.mls_id.is_some());
        }
        if let Some(days) = params.past_days {
            properties.retain(|p| p.days_on_mls.is_none_or(|d| d <= days));
        }

        Ok(properties)
    }
}

/// Browser-like headers the site expects from a navigation request.
fn browser_headers() -> HeaderMap {
    let pairs = [
        (
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
        ("accept-language", "en-US,en;q=0.9"),
        ("cache-control", "max-age=0"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "same-origin"),
        ("sec-fetch-user", "?1"),
        ("upgrade-insecure-requests", "1"),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

/// Pull the embedded `__NEXT_DATA__` JSON document out of a page.
pub fn extract_next_data(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r"script#__NEXT_DATA__").ok()?;
    let script = document.select(&selector).next()?;
    let json_text = script.text().collect::<String>();
    serde_json::from_str(&json_text).ok()
}

/// The map bounds live in an inline script, outside any JSON container.
pub fn extract_map_bounds(html: &str) -> Option<MapBounds> {
    let marker = "window.mapBounds = ";
    let start = html.find(marker)? + marker.len();
    let rest = &html[start..];
    let end = rest.find('}')?;
    serde_json::from_str(&rest[..=end]).ok()
}

/// Listing-type specific search filter, mirroring what the site's own UI
/// sends for each tab.
fn filter_state(listing_type: ListingType) -> Value {
    match listing_type {
        ListingType::ForSale => json!({
            "sortSelection": {"value": "days"},
            "isAllHomes": {"value": true},
        }),
        ListingType::ForRent => json!({
            "isForRent": {"value": true},
            "isForSaleByAgent": {"value": false},
            "isForSaleByOwner": {"value": false},
            "isNewConstruction": {"value": false},
            "isComingSoon": {"value": false},
            "isAuction": {"value": false},
            "isForSaleForeclosure": {"value": false},
            "isAllHomes": {"value": true},
        }),
        ListingType::Sold => json!({
            "isRecentlySold": {"value": true},
            "isForSaleByAgent": {"value": false},
            "isForSaleByOwner": {"value": false},
            "isNewConstruction": {"value": false},
            "isComingSoon": {"value": false},
            "isAuction": {"value": false},
            "isForSaleForeclosure": {"value": false},
            "isAllHomes": {"value": true},
        }),
    }
}

fn search_page_state_payload(bounds: &MapBounds, listing_type: ListingType) -> Value {
    json!({
        "searchQueryState": {
            "pagination": {},
            "isMapVisible": true,
            "mapBounds": {
                "west": bounds.west,
                "east": bounds.east,
                "south": bounds.south,
                "north": bounds.north,
            },
            "filterState": filter_state(listing_type),
            "isListVisible": true,
            "mapZoom": 11,
        },
        "wants": {"cat1": ["mapResults"]},
        "isDebugRequest": false,
    })
}
