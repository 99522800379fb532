use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing_subscriber::EnvFilter;

use propharvest::config::load_config;
use propharvest::domain::listing_type::ListingType;
use propharvest::domain::property::SiteName;
use propharvest::domain::search_params::SearchParams;

fn find_config_path() -> PathBuf {
    // Check common locations for config file
    let candidates = [
        PathBuf::from("config.yaml"),
        binary_dir().join("config.yaml"),
    ];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn binary_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging goes to stderr; stdout is reserved for the CSV table
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(location) = args.next() else {
        bail!("usage: propharvest <location> [for_sale|for_rent|sold] [realtor.com|zillow]");
    };
    let listing_type = match args.next() {
        Some(raw) => ListingType::parse(&raw)?,
        None => ListingType::ForSale,
    };
    let site_name = match args.next() {
        Some(raw) => SiteName::parse(&raw)?,
        None => SiteName::Realtor,
    };

    let config = load_config(&find_config_path())?;
    let mut params = SearchParams::new(location, listing_type);
    params.site_name = site_name;

    tracing::info!(
        location = %params.location,
        site = %params.site_name,
        listing_type = %params.listing_type,
        "Starting property harvest"
    );

    let table = propharvest::scrape_properties(&params, &config).await?;

    tracing::info!(records = table.len(), "Harvest complete");

    table.write_csv(std::io::stdout().lock())?;

    Ok(())
}
