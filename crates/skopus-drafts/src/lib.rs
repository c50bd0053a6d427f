//! Prospecting copy and service contract drafting on top of the
//! text-generation service, with a self-contained contract PDF renderer.

pub mod contract;
pub mod copy;
pub mod error;
pub mod generator;
pub mod layout;
pub mod pdf;

pub use contract::{ContractDraft, ContractDraftController};
pub use copy::{CopyDraft, CopyDraftController};
pub use error::DraftError;
pub use generator::DraftGenerator;
pub use layout::{layout_contract, ContractDocument};
pub use pdf::render_pdf;
