use async_trait::async_trait;

use crate::domain::property::{Property, SiteName};
use crate::domain::search_params::SearchParams;
use crate::error::Result;

/// One upstream listing site. Each implementation owns its transport and
/// shape dispatch and hands back canonical records only.
#[async_trait]
pub trait PropertySource: Send + Sync {
    fn site_name(&self) -> SiteName;

    async fn search(&self, params: &SearchParams) -> Result<Vec<Property>>;
}
