//! Lead search sessions: paging through the grounded search service,
//! plotting each batch on the map and exporting the results.

pub mod controller;
pub mod csv;
pub mod error;
pub mod source;

pub use controller::{
    BatchReport, CsvExport, LeadSearchController, LoadMoreOutcome, SearchState, SessionSnapshot,
    FIT_PADDING, RADIUS_RANGE_KM,
};
pub use error::{SearchError, SearchField};
pub use source::LeadSource;
