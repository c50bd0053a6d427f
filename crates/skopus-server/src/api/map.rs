use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use skopus_core::Coordinate;
use skopus_geo::{MapSnapshot, MarkerMap};

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
pub(super) struct RadiusRequest {
    radius_km: u32,
}

#[derive(Debug, Serialize)]
pub(super) struct RadiusData {
    /// The radius actually drawn, after clamping.
    radius_km: u32,
}

#[derive(Debug, Serialize)]
pub(super) struct FocusData {
    index: usize,
    position: Coordinate,
}

pub(super) async fn map_snapshot(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<MapSnapshot>> {
    ApiResponse::new(req_id, state.leads.with_map(MarkerMap::snapshot).await)
}

pub(super) async fn set_radius(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RadiusRequest>,
) -> Json<ApiResponse<RadiusData>> {
    let radius_km = state.leads.set_radius(body.radius_km).await;
    ApiResponse::new(req_id, RadiusData { radius_km })
}

pub(super) async fn focus_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse<FocusData>>, ApiError> {
    match state.leads.focus_lead(index).await {
        Some(position) => Ok(ApiResponse::new(req_id, FocusData { index, position })),
        None => Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("lead {index} does not exist or its address could not be located"),
        )),
    }
}
