//! Fixture-driven coverage of the map-result dispatcher and assemblers.

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use propharvest::adapters::zillow::parser::{
    classify_map_entry, parse_detail_property, parse_map_entry, parse_map_results,
};
use propharvest::domain::property::SiteName;
use propharvest::error::HarvestError;

const BASE: &str = "https://www.zillow.com";

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T00:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn home_entry() -> Value {
    json!({
        "detailUrl": "/homedetails/12-Hill-Rd/1111_zpid/",
        "price": "$625,500",
        "imgSrc": "https://photos.example.com/1111.jpg",
        "latLong": {"latitude": 30.26, "longitude": -97.74},
        "hdpData": {
            "homeInfo": {
                "zpid": "1111",
                "homeStatus": "FOR_SALE",
                "price": 625_500,
                "livingArea": 2500,
                "bedrooms": 4,
                "bathrooms": 3.5,
                "homeType": "SINGLE_FAMILY",
                "streetAddress": "12 Hill Rd",
                "city": "Austin",
                "state": "TX",
                "zipcode": "73301",
                "lotAreaValue": 8000.0,
                "lotAreaUnit": "sqft",
                "timeOnZillow": 432_000_000_u64,
                "rentZestimate": 3100
            }
        }
    })
}

fn building_entry() -> Value {
    json!({
        "isBuilding": true,
        "plid": "b-9",
        "statusType": "FOR_RENT",
        "detailUrl": "/b/the-lofts-austin-tx/",
        "price": "$1,800+",
        "address": "300 Congress Ave # 5, Austin, TX 78701",
        "latLong": {"latitude": 30.27, "longitude": -97.75},
        "minBeds": 2,
        "minBaths": 2.0,
        "minArea": 900,
        "timeOnZillow": 86_400_000_u64
    })
}

fn search_response(entries: Vec<Value>) -> Value {
    json!({"cat1": {"searchResults": {"mapResults": entries}}})
}

#[test]
fn mixed_page_produces_schema_uniform_records() {
    let payload = search_response(vec![home_entry(), building_entry()]);
    let properties = parse_map_results(&payload, BASE, fixed_now()).unwrap();
    assert_eq!(properties.len(), 2);

    let home = &properties[0];
    assert_eq!(home.site_name, SiteName::Zillow);
    assert_eq!(home.property_id.as_deref(), Some("1111"));
    assert_eq!(home.list_price, Some(625_500.0));
    // 625500 / 2500
    assert_eq!(home.prc_sqft, Some(250));
    assert_eq!(home.days_on_mls, Some(5));
    assert_eq!(home.list_date.as_deref(), Some("2024-05-27"));
    assert_eq!(home.description.lot_sqft, 8000);
    assert_eq!(home.description.baths_full, Some(3));
    assert_eq!(home.description.baths_half, Some(1));
    assert_eq!(home.estimated_value, Some(3100.0));

    let building = &properties[1];
    assert_eq!(building.property_id.as_deref(), Some("b-9"));
    assert_eq!(building.status.as_deref(), Some("FOR_RENT"));
    assert_eq!(building.description.style.as_deref(), Some("APARTMENT"));
    assert_eq!(building.address.street.as_deref(), Some("300 Congress Ave"));
    assert_eq!(building.address.unit.as_deref(), Some("5"));
    assert_eq!(building.address.zip.as_deref(), Some("78701"));
    assert_eq!(building.description.lot_sqft, 0);
    assert_eq!(building.estimated_value, None);

    // both shapes fill the same schema, absent fields stay null
    for property in &properties {
        assert_eq!(property.assessed_value, None);
        assert_eq!(property.last_sold_date, None);
        assert_eq!(property.county, None);
        assert_eq!(property.hoa_fee, None);
    }
}

#[test]
fn unrecognized_entry_shape_is_rejected() {
    let entry = json!({"detailUrl": "/x", "price": "$10"});
    let err = classify_map_entry(&entry).unwrap_err();
    assert!(matches!(err, HarvestError::Parse { .. }));
    assert!(!err.is_no_results());
}

#[test]
fn one_bad_entry_does_not_discard_the_page() {
    let payload = search_response(vec![
        json!({"nonsense": true}),
        home_entry(),
        json!({"isBuilding": true}),
        building_entry(),
    ]);
    // entry 0 has no recognized shape, entry 2 has no detailUrl
    let properties = parse_map_results(&payload, BASE, fixed_now()).unwrap();
    assert_eq!(properties.len(), 2);
}

#[test]
fn rental_home_cross_reads_sale_estimate() {
    let mut entry = home_entry();
    entry["hdpData"]["homeInfo"]["homeStatus"] = json!("FOR_RENT");
    entry["hdpData"]["homeInfo"]["zestimate"] = json!(500_000);
    entry["hdpData"]["homeInfo"]
        .as_object_mut()
        .unwrap()
        .remove("rentZestimate");
    let property = parse_map_entry(&entry, BASE, fixed_now()).unwrap();
    assert_eq!(property.estimated_value, Some(500_000.0));
}

#[test]
fn acre_lot_is_converted_to_square_feet() {
    let mut entry = home_entry();
    entry["hdpData"]["homeInfo"]["lotAreaValue"] = json!(1.0);
    entry["hdpData"]["homeInfo"]["lotAreaUnit"] = json!("acres");
    let property = parse_map_entry(&entry, BASE, fixed_now()).unwrap();
    assert_eq!(property.description.lot_sqft, 43_560);
}

#[test]
fn unknown_lot_unit_names_the_unit() {
    let mut entry = home_entry();
    entry["hdpData"]["homeInfo"]["lotAreaUnit"] = json!("hectares");
    let err = parse_map_entry(&entry, BASE, fixed_now()).unwrap_err();
    match err {
        HarvestError::UnknownLotUnit { unit } => assert_eq!(unit, "hectares"),
        other => panic!("expected UnknownLotUnit, got {other}"),
    }
}

#[test]
fn missing_lot_fields_fall_back_to_zero_sentinel() {
    let mut entry = home_entry();
    let info = entry["hdpData"]["homeInfo"].as_object_mut().unwrap();
    info.remove("lotAreaValue");
    info.remove("lotAreaUnit");
    let property = parse_map_entry(&entry, BASE, fixed_now()).unwrap();
    assert_eq!(property.description.lot_sqft, 0);
}

#[test]
fn detail_page_produces_single_record() {
    let data = json!({
        "zpid": "2222",
        "hdpUrl": "/homedetails/7-Bay-St/2222_zpid/",
        "address": {
            "streetAddress": "7 Bay St UNIT 12",
            "city": "Boston",
            "state": "MA",
            "zipcode": "02108"
        },
        "latitude": 42.36,
        "longitude": -71.06,
        "attributionInfo": {"mlsId": "B-100"},
        "resoFacts": {"stories": 3}
    });
    let property = parse_detail_property(&data, BASE).unwrap();
    assert_eq!(property.property_id.as_deref(), Some("2222"));
    assert_eq!(property.address.street.as_deref(), Some("7 Bay St"));
    assert_eq!(property.address.unit.as_deref(), Some("12"));
    assert_eq!(property.description.stories, Some(3));
    assert_eq!(property.mls_id.as_deref(), Some("B-100"));
    // not derivable from the detail shape
    assert_eq!(property.list_price, None);
    assert_eq!(property.status, None);
}

#[test]
fn days_on_market_and_list_date_stay_consistent() {
    for days in [0_u64, 1, 45, 365] {
        let mut entry = home_entry();
        entry["hdpData"]["homeInfo"]["timeOnZillow"] = json!(days * 86_400_000);
        let property = parse_map_entry(&entry, BASE, fixed_now()).unwrap();
        assert_eq!(property.days_on_mls, Some(u32::try_from(days).unwrap()));

        let list_date =
            chrono::NaiveDate::parse_from_str(property.list_date.as_deref().unwrap(), "%Y-%m-%d")
                .unwrap();
        let elapsed = fixed_now().date_naive() - list_date;
        // the two derivations agree to within a day
        let diff = elapsed.num_days() - i64::try_from(days).unwrap();
        assert!((0..=1).contains(&diff), "diff was {diff} for {days} days");
    }
}
