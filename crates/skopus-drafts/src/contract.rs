//! Service contract drafts: generation, layout and PDF export.

use std::path::{Path, PathBuf};

use serde::Serialize;
use skopus_core::text::{file_slug, safe_file_component, strip_header_markers};
use skopus_core::ContractInput;
use tracing::{debug, info, warn};

use crate::error::DraftError;
use crate::generator::DraftGenerator;
use crate::layout::{layout_contract, ContractDocument};
use crate::pdf::render_pdf;

/// A generated contract and its paginated layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractDraft {
    /// Body text with header markers removed; `**bold**` spans are kept for
    /// the layout.
    pub text: String,
    pub provider_name: String,
    pub client_name: String,
    pub document: ContractDocument,
}

impl ContractDraft {
    /// `contrato_{client}.pdf`, with the client name slugged.
    #[must_use]
    pub fn file_name(&self) -> String {
        let slug = safe_file_component(&file_slug(&self.client_name));
        format!("contrato_{slug}.pdf")
    }

    #[must_use]
    pub fn to_pdf(&self) -> Vec<u8> {
        render_pdf(&self.document)
    }
}

pub struct ContractDraftController<G> {
    generator: G,
    export_dir: PathBuf,
}

impl<G: DraftGenerator> ContractDraftController<G> {
    pub fn new(generator: G, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            export_dir: export_dir.into(),
        }
    }

    #[must_use]
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Validates `input`, generates the contract text and lays it out.
    ///
    /// # Errors
    ///
    /// - [`DraftError::ContractValidation`] listing every blank field; no
    ///   request is made.
    /// - [`DraftError::Upstream`] when generation fails.
    /// - [`DraftError::EmptyDraft`] when only header markers came back.
    pub async fn draft(&self, input: &ContractInput) -> Result<ContractDraft, DraftError> {
        input.validate()?;
        if input.logo_url.is_some() {
            debug!("logo reference is not embedded in the document");
        }

        let raw = self.generator.generate_contract(input).await?;
        let text = strip_header_markers(&raw);
        if text.is_empty() {
            warn!(service = %input.service_name, "contract generation returned no text");
            return Err(DraftError::EmptyDraft);
        }

        let document = layout_contract(&text, &input.provider_name, &input.client_name);
        info!(
            service = %input.service_name,
            pages = document.page_count(),
            "contract draft ready"
        );
        Ok(ContractDraft {
            text,
            provider_name: input.provider_name.trim().to_owned(),
            client_name: input.client_name.trim().to_owned(),
            document,
        })
    }

    /// Writes the draft as a PDF into the export directory, creating it if
    /// needed, and returns the file path.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Io`] when the directory or file cannot be
    /// written.
    pub async fn export_pdf(&self, draft: &ContractDraft) -> Result<PathBuf, DraftError> {
        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|source| DraftError::Io {
                path: self.export_dir.clone(),
                source,
            })?;

        let path = self.export_dir.join(draft.file_name());
        let bytes = draft.to_pdf();
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| DraftError::Io {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), bytes = bytes.len(), "contract exported");
        Ok(path)
    }
}
