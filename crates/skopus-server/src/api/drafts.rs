//! Copy and contract drafting.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use skopus_core::{ContractInput, CopyInput};
use skopus_drafts::{ContractDocument, CopyDraft};

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{attachment, map_draft_error, ApiError, ApiResponse};

#[derive(Debug, Serialize)]
pub(super) struct ContractData {
    text: String,
    file_name: String,
    page_count: usize,
    document: ContractDocument,
}

pub(super) async fn generate_copy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(input): Json<CopyInput>,
) -> Result<Json<ApiResponse<CopyDraft>>, ApiError> {
    let draft = state
        .copy
        .generate(&input)
        .await
        .map_err(|e| map_draft_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(req_id, draft))
}

pub(super) async fn draft_contract(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(input): Json<ContractInput>,
) -> Result<Json<ApiResponse<ContractData>>, ApiError> {
    let draft = state
        .contracts
        .draft(&input)
        .await
        .map_err(|e| map_draft_error(req_id.0.clone(), &e))?;

    let data = ContractData {
        file_name: draft.file_name(),
        page_count: draft.document.page_count(),
        text: draft.text,
        document: draft.document,
    };
    Ok(ApiResponse::new(req_id, data))
}

/// Drafts the contract and returns the PDF as an attachment.
pub(super) async fn contract_pdf(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(input): Json<ContractInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = state
        .contracts
        .draft(&input)
        .await
        .map_err(|e| map_draft_error(req_id.0.clone(), &e))?;

    let file_name = draft.file_name();
    let bytes = draft.to_pdf();
    tracing::info!(file = %file_name, bytes = bytes.len(), "contract rendered");
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/pdf"),
            ),
            (header::CONTENT_DISPOSITION, attachment(&file_name)),
        ],
        bytes,
    ))
}
