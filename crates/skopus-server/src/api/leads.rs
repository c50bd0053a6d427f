//! Lead search session: start, page, clear, inspect and export.

use std::collections::BTreeSet;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use skopus_core::{LocationDescriptor, ValidationError};
use skopus_sdr::{BatchReport, LoadMoreOutcome, SearchError, SearchField, SessionSnapshot};

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{attachment, map_search_error, ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    #[serde(default)]
    niche: String,
    /// Typed place name; ignored when `use_device_location` is set.
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    use_device_location: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    batch: BatchReport,
    session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub(super) struct LoadMoreData {
    result: LoadMoreOutcome,
    session: SessionSnapshot,
}

pub(super) async fn start_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let location = if body.use_device_location {
        let device = state.preferences.read().await.device_location;
        let Some(position) = device else {
            let missing = ValidationError {
                missing: BTreeSet::from([SearchField::Location]),
            };
            return Err(map_search_error(req_id.0, &SearchError::from(missing)));
        };
        LocationDescriptor::Device(position)
    } else {
        LocationDescriptor::Place(body.place.unwrap_or_default())
    };

    let batch = state
        .leads
        .start_search(&body.niche, location)
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;
    let session = state.leads.snapshot().await;

    Ok(ApiResponse::new(req_id, SearchData { batch, session }))
}

pub(super) async fn load_more(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<LoadMoreData>>, ApiError> {
    let result = state
        .leads
        .load_more()
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;
    let session = state.leads.snapshot().await;

    Ok(ApiResponse::new(req_id, LoadMoreData { result, session }))
}

pub(super) async fn clear(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SessionSnapshot>> {
    state.leads.clear().await;
    ApiResponse::new(req_id, state.leads.snapshot().await)
}

pub(super) async fn session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SessionSnapshot>> {
    ApiResponse::new(req_id, state.leads.snapshot().await)
}

/// The CSV file itself, not wrapped in the JSON envelope.
pub(super) async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let export = state.leads.export_csv().await;
    tracing::info!(file = %export.file_name, "lead list exported");
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, attachment(&export.file_name)),
        ],
        export.content,
    )
}
