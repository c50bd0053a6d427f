mod contract;
mod copy;
mod leads;

use clap::{Parser, Subcommand};
use skopus_core::AppConfig;
use skopus_genai::GenAiClient;
use tracing_subscriber::EnvFilter;

use crate::contract::ContractArgs;
use crate::copy::CopyArgs;
use crate::leads::LeadsArgs;

#[derive(Debug, Parser)]
#[command(name = "skopus")]
#[command(about = "Lead prospecting, outreach copy and service contracts from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search leads page by page and export them as CSV
    Leads(LeadsArgs),
    /// Draft prospecting messages
    Copy(CopyArgs),
    /// Draft a service contract and write it as PDF
    Contract(ContractArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = skopus_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Leads(args) => leads::run_leads(&config, args).await,
        Commands::Copy(args) => copy::run_copy(&config, args).await,
        Commands::Contract(args) => contract::run_contract(&config, args).await,
    }
}

/// Text-generation client configured from the environment.
fn genai_client(config: &AppConfig) -> anyhow::Result<GenAiClient> {
    Ok(GenAiClient::with_base_url(
        &config.genai_api_key,
        config.genai_timeout_secs,
        &config.user_agent,
        &config.genai_base_url,
    )?
    .with_retry(config.genai_max_retries, config.genai_retry_backoff_base_ms))
}
