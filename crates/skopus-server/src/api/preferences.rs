use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use skopus_core::{Coordinate, Theme};

use crate::middleware::RequestId;
use crate::state::{AppState, Preferences};

use super::{map_search_error, ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
pub(super) struct PreferencesUpdate {
    theme: Theme,
}

pub(super) async fn get_preferences(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Preferences>> {
    let prefs = *state.preferences.read().await;
    ApiResponse::new(req_id, prefs)
}

pub(super) async fn update_preferences(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<PreferencesUpdate>,
) -> Json<ApiResponse<Preferences>> {
    let prefs = {
        let mut prefs = state.preferences.write().await;
        prefs.theme = body.theme;
        *prefs
    };
    ApiResponse::new(req_id, prefs)
}

/// Records the device position and pans the map there.
pub(super) async fn update_device_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(position): Json<Coordinate>,
) -> Result<Json<ApiResponse<Preferences>>, ApiError> {
    state
        .leads
        .show_device_location(position)
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;

    let prefs = {
        let mut prefs = state.preferences.write().await;
        prefs.device_location = Some(position);
        *prefs
    };
    tracing::debug!(%position, "device location recorded");
    Ok(ApiResponse::new(req_id, prefs))
}
