//! Client for the generative-AI `generateContent` endpoint and the three
//! product calls built on it: grounded lead search, prospecting copy and
//! service-contract drafting.

pub mod client;
pub mod drafts;
pub mod error;
pub mod leads;
pub mod prompts;
pub mod types;

mod retry;

pub use client::{GenAiClient, GenerateOptions};
pub use drafts::DraftService;
pub use error::GenAiError;
pub use leads::{parse_leads, LeadSearchService};
