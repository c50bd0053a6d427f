//! Shared domain types, validation, text post-processing and configuration
//! for the skopus workspace.

pub mod app_config;
pub mod config;
pub mod drafts;
pub mod geo;
pub mod leads;
pub mod preferences;
pub mod text;
pub mod validation;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use drafts::{ContractField, ContractInput, CopyField, CopyInput, Tone};
pub use geo::Coordinate;
pub use leads::{Lead, LocationDescriptor, SearchQuery};
pub use preferences::Theme;
pub use validation::{FieldId, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
