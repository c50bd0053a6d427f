use std::future::Future;

use skopus_core::{Lead, LocationDescriptor};
use skopus_genai::{GenAiError, LeadSearchService};

/// Produces one page of leads for a niche and location.
pub trait LeadSource: Send + Sync {
    fn search(
        &self,
        niche: &str,
        location: &LocationDescriptor,
        page: u32,
    ) -> impl Future<Output = Result<Vec<Lead>, GenAiError>> + Send;
}

impl LeadSource for LeadSearchService {
    async fn search(
        &self,
        niche: &str,
        location: &LocationDescriptor,
        page: u32,
    ) -> Result<Vec<Lead>, GenAiError> {
        LeadSearchService::search(self, niche, location, page).await
    }
}
