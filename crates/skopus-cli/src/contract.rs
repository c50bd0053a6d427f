//! `skopus contract`: draft a contract and save it as PDF.

use std::path::PathBuf;

use clap::Args;
use skopus_core::{AppConfig, ContractInput};
use skopus_drafts::ContractDraftController;
use skopus_genai::DraftService;

#[derive(Debug, Args)]
pub struct ContractArgs {
    /// Service being contracted
    #[arg(long)]
    pub service: String,
    /// Amount in BRL (e.g. "2.500,00")
    #[arg(long)]
    pub value: String,
    /// Delivery deadline in days
    #[arg(long)]
    pub deadline: String,
    #[arg(long)]
    pub provider_name: String,
    /// Provider CPF or CNPJ
    #[arg(long)]
    pub provider_id: String,
    #[arg(long)]
    pub client_name: String,
    /// Client CPF or CNPJ
    #[arg(long)]
    pub client_id: String,
    /// City/state where the contract is signed
    #[arg(long)]
    pub location: String,
    /// Signature date as dd/mm/yyyy (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
    /// Leave out the late-payment fine clause
    #[arg(long)]
    pub no_delay_fine: bool,
    /// Leave out the termination fine clause
    #[arg(long)]
    pub no_default_fine: bool,
    /// Additional terms to include
    #[arg(long)]
    pub extra: Option<String>,
    /// Directory for the PDF (defaults to the export directory)
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Also print the contract text
    #[arg(long)]
    pub print: bool,
}

impl ContractArgs {
    pub(crate) fn to_input(&self) -> ContractInput {
        let defaults = ContractInput::default();
        ContractInput {
            service_name: self.service.clone(),
            provider_name: self.provider_name.clone(),
            provider_id: self.provider_id.clone(),
            client_name: self.client_name.clone(),
            client_id: self.client_id.clone(),
            value: self.value.clone(),
            deadline: self.deadline.clone(),
            location: self.location.clone(),
            date: self.date.clone().unwrap_or(defaults.date),
            delay_fine: !self.no_delay_fine,
            default_fine: !self.no_default_fine,
            extra_info: self.extra.clone(),
            logo_url: None,
        }
    }
}

pub(crate) async fn run_contract(config: &AppConfig, args: ContractArgs) -> anyhow::Result<()> {
    let service = DraftService::new(
        crate::genai_client(config)?,
        config.draft_model.clone(),
        config.thinking_budget,
    );
    let dir = args.out.clone().unwrap_or_else(|| config.export_dir.clone());
    let controller = ContractDraftController::new(service, dir);

    let draft = controller.draft(&args.to_input()).await?;
    if args.print {
        println!("{}\n", draft.text);
    }
    let path = controller.export_pdf(&draft).await?;
    println!(
        "wrote {} ({} page(s))",
        path.display(),
        draft.document.page_count()
    );
    Ok(())
}
