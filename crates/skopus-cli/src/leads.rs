//! `skopus leads`: run a search session and save the CSV export.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use skopus_core::{AppConfig, Coordinate, LocationDescriptor};
use skopus_genai::LeadSearchService;
use skopus_geo::{CachedGeocoder, MarkerMap, NominatimClient};
use skopus_sdr::{LeadSearchController, LoadMoreOutcome};

#[derive(Debug, Args)]
pub struct LeadsArgs {
    /// Market or business type to prospect (e.g. "Barbearias")
    #[arg(long)]
    pub niche: String,
    /// City, neighbourhood or address to search around
    #[arg(long, required_unless_present = "near", conflicts_with = "near")]
    pub location: Option<String>,
    /// Search around a coordinate instead of a place name
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub near: Option<Coordinate>,
    /// Number of result pages to fetch
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
    /// CSV destination (defaults to the export directory)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl LeadsArgs {
    pub(crate) fn location(&self) -> LocationDescriptor {
        match self.near {
            Some(position) => LocationDescriptor::Device(position),
            None => LocationDescriptor::Place(self.location.clone().unwrap_or_default()),
        }
    }
}

pub(crate) async fn run_leads(config: &AppConfig, args: LeadsArgs) -> anyhow::Result<()> {
    let search = LeadSearchService::new(crate::genai_client(config)?, config.search_model.clone());
    let geocoder = CachedGeocoder::new(NominatimClient::with_base_url(
        config.geocoder_timeout_secs,
        &config.user_agent,
        &config.geocoder_url,
    )?);
    let map = MarkerMap::new(config.map_center, config.map_radius_km);
    let controller = LeadSearchController::new(search, geocoder, map, config.lead_cap)
        .with_geocode_concurrency(config.geocoder_concurrency);

    let first = controller.start_search(&args.niche, args.location()).await?;
    println!(
        "page {}: {} leads ({} located on the map)",
        first.page, first.received, first.placed
    );

    for _ in 1..args.pages {
        match controller.load_more().await? {
            LoadMoreOutcome::Loaded(report) => println!(
                "page {}: {} leads ({} located, {} total)",
                report.page, report.received, report.placed, report.total
            ),
            LoadMoreOutcome::CapReached => {
                println!("lead cap of {} reached", config.lead_cap);
                break;
            }
            LoadMoreOutcome::InFlight | LoadMoreOutcome::NoActiveSearch => break,
        }
    }

    let export = controller.export_csv().await;
    let path = args
        .out
        .unwrap_or_else(|| config.export_dir.join(&export.file_name));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(&path, export.content.as_bytes())
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    println!(
        "wrote {} leads to {}",
        controller.lead_count().await,
        path.display()
    );
    Ok(())
}
