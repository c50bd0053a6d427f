use std::future::Future;

use skopus_core::{ContractInput, CopyInput};
use skopus_genai::{DraftService, GenAiError};

/// Text generation backing the copy and contract controllers.
pub trait DraftGenerator: Send + Sync {
    /// Raw copy text, options separated by the divider token.
    fn generate_copy(
        &self,
        input: &CopyInput,
    ) -> impl Future<Output = Result<String, GenAiError>> + Send;

    fn generate_contract(
        &self,
        input: &ContractInput,
    ) -> impl Future<Output = Result<String, GenAiError>> + Send;
}

impl DraftGenerator for DraftService {
    async fn generate_copy(&self, input: &CopyInput) -> Result<String, GenAiError> {
        DraftService::generate_copy(self, input).await
    }

    async fn generate_contract(&self, input: &ContractInput) -> Result<String, GenAiError> {
        DraftService::generate_contract(self, input).await
    }
}
