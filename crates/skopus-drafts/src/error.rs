use std::path::PathBuf;

use skopus_core::{ContractField, CopyField, ValidationError};
use skopus_genai::GenAiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error(transparent)]
    CopyValidation(#[from] ValidationError<CopyField>),

    #[error(transparent)]
    ContractValidation(#[from] ValidationError<ContractField>),

    #[error("draft generation failed: {0}")]
    Upstream(#[from] GenAiError),

    /// The generator answered, but nothing usable was left after
    /// post-processing.
    #[error("the generated draft was empty")]
    EmptyDraft,

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DraftError {
    /// Identifiers of the missing fields for validation failures.
    #[must_use]
    pub fn missing_fields(&self) -> Option<Vec<&'static str>> {
        match self {
            Self::CopyValidation(err) => Some(err.field_names()),
            Self::ContractValidation(err) => Some(err.field_names()),
            _ => None,
        }
    }
}
