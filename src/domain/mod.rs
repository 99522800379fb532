pub mod listing_type;
pub mod property;
pub mod search_params;
