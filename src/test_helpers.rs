//! Fixture builders shared by unit tests.

use serde_json::{Value, json};

/// Standard map-result entry with a nested homeInfo block.
pub fn home_entry() -> Value {
    json!({
        "detailUrl": "/homedetails/250-Birch-Blvd/44444444_zpid/",
        "price": "$450,000",
        "info1String": "MLS ID #998877",
        "imgSrc": "https://photos.example.com/44444444.jpg",
        "latLong": {"latitude": 33.42, "longitude": -111.93},
        "hdpData": {
            "homeInfo": {
                "zpid": "44444444",
                "homeStatus": "FOR_SALE",
                "price": 450000,
                "livingArea": 1800,
                "bedrooms": 3,
                "bathrooms": 2.5,
                "homeType": "SINGLE_FAMILY",
                "streetAddress": "250 Birch Blvd APT 2A",
                "city": "Tempe",
                "state": "AZ",
                "zipcode": "85281",
                "lotAreaValue": 0.25,
                "lotAreaUnit": "acres",
                // 12 days and one hour on the market
                "timeOnZillow": 1_040_400_000_u64,
                "zestimate": 460000,
                "rentZestimate": 2200
            }
        }
    })
}

/// Multi-unit building entry with a price range and no homeInfo block.
pub fn building_entry() -> Value {
    json!({
        "isBuilding": true,
        "plid": "pl-777",
        "statusType": "FOR_RENT",
        "detailUrl": "/b/800-grand-ave-phoenix-az/",
        "price": "$1,500+",
        "address": "800 Grand Ave, Phoenix, AZ 85004",
        "imgSrc": "https://photos.example.com/pl-777.jpg",
        "latLong": {"latitude": 33.45, "longitude": -112.07},
        "minBeds": 1,
        "minBaths": 1.0,
        "minArea": 600,
        // 3 days on the market
        "timeOnZillow": 259_200_000_u64
    })
}

/// Backend search response wrapping the given map-result entries.
pub fn map_results_response(entries: Vec<Value>) -> Value {
    json!({
        "cat1": {
            "searchResults": {
                "mapResults": entries
            }
        }
    })
}

/// Search page HTML: a search-state container plus the map bounds the
/// backend query needs.
pub fn search_state_html() -> String {
    let next_data = json!({
        "props": {
            "pageProps": {
                "searchPageState": {}
            }
        }
    });
    format!(
        "<html><head><script id=\"__NEXT_DATA__\" type=\"application/json\">{next_data}</script>\
         <script>window.mapBounds = {{\"west\": -112.3, \"east\": -111.5, \"south\": 33.2, \"north\": 33.7}};</script>\
         </head><body></body></html>"
    )
}

/// Detail page HTML: the cached property object nested inside the
/// JSON-in-a-string gdpClientCache container.
pub fn detail_cache_html(property: &Value) -> String {
    let cache = json!({
        "ForSaleDoubleScrollFullRenderQuery{}": {
            "property": property
        }
    });
    let next_data = json!({
        "props": {
            "pageProps": {
                "gdpClientCache": cache.to_string()
            }
        }
    });
    format!(
        "<html><head><script id=\"__NEXT_DATA__\" type=\"application/json\">{next_data}</script>\
         </head><body></body></html>"
    )
}

/// One row of a realtor.com `home_search` result set.
pub fn realtor_search_result() -> Value {
    json!({
        "property_id": "M1234567890",
        "list_date": "2024-02-20T14:00:00Z",
        "status": "for_sale",
        "last_sold_date": "2015-08-01",
        "list_price": 385000,
        "price_per_sqft": 220,
        "description": {
            "sqft": 1750,
            "beds": 3,
            "baths_full": 2,
            "baths_half": 1,
            "lot_sqft": 6500,
            "sold_price": 310000,
            "year_built": 2001,
            "garage": 2,
            "type": "single_family",
            "stories": 1
        },
        "source": {"id": "NTRE", "listing_id": "20541234"},
        "hoa": {"fee": 45},
        "location": {
            "address": {
                "street_number": "2530",
                "street_name": "Al Lipscomb",
                "street_suffix": "Way",
                "unit": null,
                "city": "Dallas",
                "state_code": "TX",
                "postal_code": "75215",
                "coordinate": {"lon": -96.79, "lat": 32.77}
            },
            "neighborhoods": [{"name": "South Dallas"}, {"name": "Cedars"}]
        }
    })
}

/// Minimal cached detail property.
pub fn detail_property() -> Value {
    json!({
        "zpid": 55555,
        "hdpUrl": "/homedetails/9-Oak-Ln/55555_zpid/",
        "address": {
            "streetAddress": "9 Oak Ln",
            "city": "Portland",
            "state": "OR",
            "zipcode": "97035"
        },
        "latitude": 45.5,
        "longitude": -122.6,
        "attributionInfo": {"mlsId": "ML-42"},
        "resoFacts": {"stories": 2}
    })
}
