pub mod address;
pub mod client;
pub mod normalize;
pub mod parser;

pub use client::ZillowScraper;
