//! Prospecting copy drafts.

use serde::Serialize;
use skopus_core::text::split_copy_options;
use skopus_core::CopyInput;
use tracing::{info, warn};

use crate::error::DraftError;
use crate::generator::DraftGenerator;

/// Alternative messages produced for one campaign, in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyDraft {
    pub options: Vec<String>,
}

pub struct CopyDraftController<G> {
    generator: G,
}

impl<G: DraftGenerator> CopyDraftController<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Validates `input`, issues one generation request and splits the
    /// answer into options with bold markup removed.
    ///
    /// # Errors
    ///
    /// - [`DraftError::CopyValidation`] listing every blank field; no request
    ///   is made.
    /// - [`DraftError::Upstream`] when generation fails.
    /// - [`DraftError::EmptyDraft`] when no option survives post-processing.
    pub async fn generate(&self, input: &CopyInput) -> Result<CopyDraft, DraftError> {
        input.validate()?;

        let raw = self.generator.generate_copy(input).await?;
        let options = split_copy_options(&raw);
        if options.is_empty() {
            warn!(niche = %input.niche, "copy generation returned no options");
            return Err(DraftError::EmptyDraft);
        }

        info!(
            niche = %input.niche,
            tone = input.tone.as_str(),
            options = options.len(),
            "copy draft ready"
        );
        Ok(CopyDraft { options })
    }
}
