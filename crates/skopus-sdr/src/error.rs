use serde::Serialize;
use skopus_core::{Coordinate, FieldId, ValidationError};
use skopus_genai::GenAiError;
use thiserror::Error;

/// Inputs a search cannot start without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchField {
    Niche,
    Location,
}

impl FieldId for SearchField {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Niche => "niche",
            Self::Location => "location",
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError<SearchField>),

    #[error("lead search failed: {0}")]
    Upstream(#[from] GenAiError),

    /// The session was cleared or restarted while the request was in flight;
    /// its result was dropped.
    #[error("search response superseded by a newer session (epoch {epoch})")]
    Superseded { epoch: u64 },

    #[error("invalid device coordinate: {0}")]
    InvalidCoordinate(Coordinate),
}
