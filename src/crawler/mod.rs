//! Crawler module for harvesting contact data from roster websites
//!
//! This module contains the crawl pipeline, including:
//! - Reachability checks before a domain is crawled
//! - Same-host depth-first traversal with a per-run visited set
//! - A bounded worker pool running domains concurrently
//! - Interrupt handling and browser shutdown
//! - Overall sweep orchestration

mod orchestrator;
mod pool;
mod reachability;
mod shutdown;
mod traversal;

pub use orchestrator::{DomainOutcome, Orchestrator};
pub use pool::WorkerPool;
pub use reachability::{check_reachability, Reachability};
pub use shutdown::{drain_browser, spawn_interrupt_handler};
pub use traversal::{Traversal, TraversalLimits, VisitedSet};

use crate::config::{validate, Config};
use crate::output::RunReport;
use crate::records::{merge_records, read_roster, write_dataset};
use crate::SweepError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runs a complete sweep
///
/// This is the main entry point for a run. It will:
/// 1. Validate the configuration and read the roster
/// 2. Crawl every roster domain
/// 3. Close any surface left open
/// 4. Merge the findings into the roster records
/// 5. Atomically write the dataset
///
/// The dataset is written even when the run was interrupted, so partial
/// findings are kept.
pub async fn sweep(config: &Config, cancel: CancellationToken) -> Result<RunReport, SweepError> {
    validate(config)?;
    let roster = read_roster(Path::new(&config.input.roster_path))?;
    let orchestrator = Orchestrator::new(config)?;

    let report = orchestrator.run_all(&roster.records, cancel).await;
    orchestrator.shutdown().await;

    let merged = merge_records(roster.records, report.updates.clone());
    write_dataset(
        Path::new(&config.output.dataset_path),
        &roster.columns,
        &merged,
    )?;

    Ok(report)
}
