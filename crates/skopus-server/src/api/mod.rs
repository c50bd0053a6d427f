mod drafts;
mod leads;
mod map;
mod preferences;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use skopus_drafts::DraftError;
use skopus_sdr::SearchError;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Identifiers of the blank required fields (`validation_error` only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(req_id: RequestId, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(req_id.0),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                fields: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<&'static str>) -> Self {
        self.error.fields = Some(fields.into_iter().map(str::to_owned).collect());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    match error {
        SearchError::Validation(validation) => {
            ApiError::new(request_id, "validation_error", validation.to_string())
                .with_fields(validation.field_names())
        }
        SearchError::Upstream(e) => {
            tracing::error!(error = %e, "lead search upstream failure");
            ApiError::new(request_id, "upstream_error", "lead search failed")
        }
        SearchError::Superseded { .. } => ApiError::new(
            request_id,
            "conflict",
            "the search was cleared or restarted before this page arrived",
        ),
        SearchError::InvalidCoordinate(_) => {
            ApiError::new(request_id, "bad_request", error.to_string())
        }
    }
}

pub(super) fn map_draft_error(request_id: String, error: &DraftError) -> ApiError {
    if let Some(fields) = error.missing_fields() {
        return ApiError::new(request_id, "validation_error", error.to_string()).with_fields(fields);
    }
    match error {
        DraftError::Upstream(e) => {
            tracing::error!(error = %e, "draft generation upstream failure");
            ApiError::new(request_id, "upstream_error", "draft generation failed")
        }
        DraftError::EmptyDraft => ApiError::new(request_id, "upstream_error", error.to_string()),
        _ => {
            tracing::error!(error = %error, "draft request failed");
            ApiError::new(request_id, "internal_error", "draft request failed")
        }
    }
}

/// `attachment` disposition with a header-safe file name.
pub(super) fn attachment(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
        .expose_headers([header::CONTENT_DISPOSITION, HeaderName::from_static("x-request-id")])
}

/// Routes that call the text-generation service.
fn generation_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/leads/search", post(leads::start_search))
        .route("/api/v1/leads/more", post(leads::load_more))
        .route("/api/v1/copy", post(drafts::generate_copy))
        .route("/api/v1/contracts", post(drafts::draft_contract))
        .route("/api/v1/contracts/pdf", post(drafts::contract_pdf))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let session_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/api/v1/preferences",
            get(preferences::get_preferences).put(preferences::update_preferences),
        )
        .route(
            "/api/v1/device-location",
            put(preferences::update_device_location),
        )
        .route("/api/v1/leads", get(leads::session).delete(leads::clear))
        .route("/api/v1/leads/export.csv", get(leads::export_csv))
        .route("/api/v1/leads/{index}/focus", post(map::focus_lead))
        .route("/api/v1/map", get(map::map_snapshot))
        .route("/api/v1/map/radius", put(map::set_radius));

    Router::new()
        .merge(session_routes)
        .merge(generation_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                )),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    ApiResponse::new(req_id, HealthData { status: "ok" })
}

/// Shared budget of the generation routes: 30 requests per minute.
pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(30, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
