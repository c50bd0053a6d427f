//! `skopus copy`: draft prospecting messages and print them.

use clap::Args;
use skopus_core::{AppConfig, CopyInput, Tone};
use skopus_drafts::CopyDraftController;
use skopus_genai::DraftService;

#[derive(Debug, Args)]
pub struct CopyArgs {
    /// Your name, used to sign the message
    #[arg(long)]
    pub user_name: String,
    #[arg(long)]
    pub niche: String,
    /// Who the message is addressed to
    #[arg(long)]
    pub contact_name: String,
    /// The lead's pain point
    #[arg(long)]
    pub problem: String,
    #[arg(long)]
    pub solution: String,
    #[arg(long)]
    pub differential: String,
    /// What the message should lead to (e.g. "agendar reunião")
    #[arg(long)]
    pub goal: String,
    /// formal, casual or objective
    #[arg(long, default_value = "casual")]
    pub tone: Tone,
}

impl From<CopyArgs> for CopyInput {
    fn from(args: CopyArgs) -> Self {
        Self {
            user_name: args.user_name,
            niche: args.niche,
            contact_name: args.contact_name,
            lead_problem: args.problem,
            solution: args.solution,
            differential: args.differential,
            goal: args.goal,
            tone: args.tone,
        }
    }
}

pub(crate) async fn run_copy(config: &AppConfig, args: CopyArgs) -> anyhow::Result<()> {
    let service = DraftService::new(
        crate::genai_client(config)?,
        config.draft_model.clone(),
        config.thinking_budget,
    );
    let controller = CopyDraftController::new(service);

    let draft = controller.generate(&CopyInput::from(args)).await?;
    for (i, option) in draft.options.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("--- Opção {} ---\n{option}", i + 1);
    }
    Ok(())
}
