use std::net::SocketAddr;
use std::path::PathBuf;

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub genai_api_key: String,
    pub genai_base_url: String,
    pub search_model: String,
    pub draft_model: String,
    pub thinking_budget: u32,
    pub genai_timeout_secs: u64,
    pub genai_max_retries: u32,
    pub genai_retry_backoff_base_ms: u64,
    pub geocoder_url: String,
    pub geocoder_timeout_secs: u64,
    /// Geocode lookups in flight at once when placing a batch of markers.
    pub geocoder_concurrency: usize,
    pub user_agent: String,
    pub lead_cap: usize,
    pub map_center: Coordinate,
    pub map_radius_km: u32,
    pub export_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("genai_api_key", &"[redacted]")
            .field("genai_base_url", &self.genai_base_url)
            .field("search_model", &self.search_model)
            .field("draft_model", &self.draft_model)
            .field("thinking_budget", &self.thinking_budget)
            .field("genai_timeout_secs", &self.genai_timeout_secs)
            .field("genai_max_retries", &self.genai_max_retries)
            .field(
                "genai_retry_backoff_base_ms",
                &self.genai_retry_backoff_base_ms,
            )
            .field("geocoder_url", &self.geocoder_url)
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .field("geocoder_concurrency", &self.geocoder_concurrency)
            .field("user_agent", &self.user_agent)
            .field("lead_cap", &self.lead_cap)
            .field("map_center", &self.map_center)
            .field("map_radius_km", &self.map_radius_km)
            .field("export_dir", &self.export_dir)
            .finish()
    }
}
