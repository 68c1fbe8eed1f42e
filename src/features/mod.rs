//! Feature extraction
//!
//! Derived, per-query summaries of raw match history.

pub mod form;

pub use form::{compute_form, FormAggregator, FormSummary, TeamMatching, DEFAULT_WINDOW};
