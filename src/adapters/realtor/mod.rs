pub mod client;
pub mod parser;

pub use client::RealtorScraper;
