// ReviewScope: sentiment and clustering analytics for app-store reviews
//
// This is the library root. Each module corresponds to one stage of the
// pipeline: ingestion feeds the review set, the analysis and themes
// modules derive cluster views from it.

pub mod analysis;
pub mod appstore;
pub mod cancel;
pub mod config;
pub mod error;
pub mod output;
pub mod reviews;
pub mod themes;
