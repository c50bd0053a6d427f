//! Outreach-copy and contract generation.

use skopus_core::text::strip_header_markers;
use skopus_core::{ContractInput, CopyInput};

use crate::client::{GenAiClient, GenerateOptions};
use crate::error::GenAiError;
use crate::prompts;

/// Text generation for the copy and contract drafting flows.
///
/// Both flows use the same reasoning model and thinking budget.
#[derive(Debug, Clone)]
pub struct DraftService {
    client: GenAiClient,
    model: String,
    thinking_budget: u32,
}

impl DraftService {
    #[must_use]
    pub fn new(client: GenAiClient, model: impl Into<String>, thinking_budget: u32) -> Self {
        Self {
            client,
            model: model.into(),
            thinking_budget,
        }
    }

    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            thinking_budget: Some(self.thinking_budget),
            ..GenerateOptions::default()
        }
    }

    /// Returns the raw generated copy; splitting into options is left to
    /// the caller.
    ///
    /// # Errors
    ///
    /// Propagates [`GenAiClient::generate`] errors.
    pub async fn generate_copy(&self, input: &CopyInput) -> Result<String, GenAiError> {
        let prompt = prompts::copy_draft(input);
        self.client.generate(&self.model, &prompt, &self.options()).await
    }

    /// Returns the generated contract with header markers removed.
    ///
    /// # Errors
    ///
    /// Propagates [`GenAiClient::generate`] errors, and returns
    /// [`GenAiError::EmptyResponse`] when nothing but header markers came back.
    pub async fn generate_contract(&self, input: &ContractInput) -> Result<String, GenAiError> {
        let prompt = prompts::contract_draft(input);
        let raw = self
            .client
            .generate(&self.model, &prompt, &self.options())
            .await?;
        clean_contract(&raw).ok_or_else(|| GenAiError::EmptyResponse {
            model: self.model.clone(),
        })
    }
}

fn clean_contract(raw: &str) -> Option<String> {
    let cleaned = strip_header_markers(raw);
    (!cleaned.is_empty()).then_some(cleaned)
}
