//! Application state shared by every handler.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skopus_core::{AppConfig, Coordinate, Theme};
use skopus_drafts::{ContractDraftController, CopyDraftController};
use skopus_genai::{DraftService, GenAiClient, LeadSearchService};
use skopus_geo::{CachedGeocoder, MarkerMap, NominatimClient};
use skopus_sdr::LeadSearchController;
use tokio::sync::RwLock;

pub type LeadController =
    LeadSearchController<LeadSearchService, CachedGeocoder<NominatimClient>, MarkerMap>;

/// Per-user settings kept for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    /// Last position reported by the device, used for "near me" searches.
    pub device_location: Option<Coordinate>,
}

#[derive(Clone)]
pub struct AppState {
    pub leads: Arc<LeadController>,
    pub copy: Arc<CopyDraftController<DraftService>>,
    pub contracts: Arc<ContractDraftController<DraftService>>,
    pub preferences: Arc<RwLock<Preferences>>,
}

impl AppState {
    /// Wires the controllers to the configured upstream services.
    ///
    /// # Errors
    ///
    /// Fails when an HTTP client cannot be built or a base URL is invalid.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let genai = GenAiClient::with_base_url(
            &config.genai_api_key,
            config.genai_timeout_secs,
            &config.user_agent,
            &config.genai_base_url,
        )?
        .with_retry(config.genai_max_retries, config.genai_retry_backoff_base_ms);

        let geocoder = CachedGeocoder::new(NominatimClient::with_base_url(
            config.geocoder_timeout_secs,
            &config.user_agent,
            &config.geocoder_url,
        )?);

        let search = LeadSearchService::new(genai.clone(), config.search_model.clone());
        let drafts = DraftService::new(genai, config.draft_model.clone(), config.thinking_budget);
        let map = MarkerMap::new(config.map_center, config.map_radius_km);

        tracing::debug!(
            search_model = %config.search_model,
            draft_model = %config.draft_model,
            lead_cap = config.lead_cap,
            "application state ready"
        );

        Ok(Self {
            leads: Arc::new(
                LeadSearchController::new(search, geocoder, map, config.lead_cap)
                    .with_geocode_concurrency(config.geocoder_concurrency),
            ),
            copy: Arc::new(CopyDraftController::new(drafts.clone())),
            contracts: Arc::new(ContractDraftController::new(
                drafts,
                config.export_dir.clone(),
            )),
            preferences: Arc::new(RwLock::new(Preferences::default())),
        })
    }
}
