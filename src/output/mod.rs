//! Run reporting
//!
//! This module handles:
//! - Folding per-domain outcomes into [`AnalystCounters`]
//! - The [`RunReport`] returned by the orchestrator
//! - Printing the end-of-run summary

pub mod stats;
mod summary;

pub use stats::{AnalystCounters, DomainStatus, RunReport};
pub use summary::{format_summary, print_summary};
