//! Run counters and the final run report
//!
//! Counters are observational only: they are folded by the orchestrator's
//! driver loop and never influence crawling decisions.

use crate::extract::ExtractedData;
use crate::records::CompanyRecord;
use chrono::{DateTime, Utc};
use std::fmt;

/// Final state of one roster domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainStatus {
    /// Reachable and traversed to completion
    Crawled,
    /// Failed the reachability check
    Unreachable,
    /// Errored or timed out during its run
    Failed,
    /// Stopped by an interrupt
    Cancelled,
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Crawled => "crawled",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Aggregate counts over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalystCounters {
    /// Domains taken from the roster
    pub websites_total: u64,
    pub websites_crawled: u64,
    pub websites_unreachable: u64,
    pub websites_failed: u64,
    pub websites_cancelled: u64,

    pub phones_found: u64,
    pub addresses_found: u64,
    pub social_links_found: u64,
}

impl AnalystCounters {
    pub fn new(websites_total: u64) -> Self {
        Self {
            websites_total,
            ..Self::default()
        }
    }

    pub fn record_status(&mut self, status: DomainStatus) {
        match status {
            DomainStatus::Crawled => self.websites_crawled += 1,
            DomainStatus::Unreachable => self.websites_unreachable += 1,
            DomainStatus::Failed => self.websites_failed += 1,
            DomainStatus::Cancelled => self.websites_cancelled += 1,
        }
    }

    pub fn record_findings(&mut self, data: &ExtractedData) {
        self.phones_found += data.phone_numbers.len() as u64;
        self.addresses_found += data.physical_addresses.len() as u64;
        self.social_links_found += data.social_media_links.len() as u64;
    }

    /// Domains with a final status so far
    pub fn websites_finished(&self) -> u64 {
        self.websites_crawled
            + self.websites_unreachable
            + self.websites_failed
            + self.websites_cancelled
    }

    /// Share of roster domains that were crawled, in percent
    pub fn crawl_rate(&self) -> f64 {
        if self.websites_total > 0 {
            (self.websites_crawled as f64 / self.websites_total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub counters: AnalystCounters,
    /// One update record per crawled domain, in completion order
    pub updates: Vec<CompanyRecord>,
}

impl RunReport {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    pub fn was_cancelled(&self) -> bool {
        self.counters.websites_cancelled > 0
    }
}
