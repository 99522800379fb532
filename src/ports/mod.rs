pub mod property_source;
