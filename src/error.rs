use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse listing payload: {reason}")]
    Parse { reason: String },

    #[error("No results found for location: {location}")]
    NoResults { location: String },

    #[error("Unable to convert lot size, unknown unit: {unit}")]
    UnknownLotUnit { unit: String },

    #[error("Malformed address string: {raw}")]
    MalformedAddress { raw: String },

    #[error("Invalid search parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl HarvestError {
    /// True for the expected "empty upstream result set" outcome, as opposed
    /// to a malformed-schema failure.
    pub fn is_no_results(&self) -> bool {
        matches!(self, HarvestError::NoResults { .. })
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
