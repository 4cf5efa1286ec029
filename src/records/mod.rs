//! Company records: roster input, merging and dataset output
//!
//! The roster is a CSV keyed by `domain`. The same file format is used for
//! the enriched dataset, so a previous run's output can be fed back in as a
//! roster without losing what was already found.

mod dataset;
mod merge;
mod roster;

pub use dataset::{dataset_headers, write_dataset, write_dataset_to};
pub use merge::merge_records;
pub use roster::{read_roster, read_roster_from, Roster};

use crate::extract::ExtractedData;
use std::collections::BTreeMap;

pub const DOMAIN: &str = "domain";
pub const COMMERCIAL_NAME: &str = "company_commercial_name";
pub const LEGAL_NAME: &str = "company_legal_name";
pub const ALL_NAMES: &str = "company_all_available_names";
pub const PHYSICAL_ADDRESSES: &str = "physical_addresses";
pub const SOCIAL_MEDIA_LINKS: &str = "social_media_links";
pub const PHONE_NUMBERS: &str = "phone_numbers";

/// Columns filled from crawl results
pub const MERGEABLE_FIELDS: [&str; 3] = [PHYSICAL_ADDRESSES, SOCIAL_MEDIA_LINKS, PHONE_NUMBERS];

/// Separator for multi-value cells
pub const VALUE_SEPARATOR: char = '|';

/// One company of the roster, keyed case-insensitively by domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyRecord {
    pub domain: String,
    pub commercial_name: Option<String>,
    pub legal_name: Option<String>,
    pub all_names: Vec<String>,
    pub physical_addresses: Vec<String>,
    pub social_media_links: Vec<String>,
    pub phone_numbers: Vec<String>,
    /// Roster columns this crate does not interpret, carried through unchanged
    pub extra: BTreeMap<String, String>,
}

impl CompanyRecord {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// Update record holding what a domain run found
    pub fn from_extracted(domain: impl Into<String>, data: ExtractedData) -> Self {
        Self {
            domain: domain.into(),
            physical_addresses: data.physical_addresses.into_vec(),
            social_media_links: data.social_media_links.into_vec(),
            phone_numbers: data.phone_numbers.into_vec(),
            ..Self::default()
        }
    }

    /// Lower-cased domain used as the merge key
    pub fn key(&self) -> String {
        self.domain.trim().to_lowercase()
    }

    /// Cell value of a column, multi-value fields joined with `|`
    pub fn field(&self, column: &str) -> Option<String> {
        match column {
            DOMAIN => Some(self.domain.clone()),
            COMMERCIAL_NAME => self.commercial_name.clone(),
            LEGAL_NAME => self.legal_name.clone(),
            ALL_NAMES => Some(join_values(&self.all_names)),
            PHYSICAL_ADDRESSES => Some(join_values(&self.physical_addresses)),
            SOCIAL_MEDIA_LINKS => Some(join_values(&self.social_media_links)),
            PHONE_NUMBERS => Some(join_values(&self.phone_numbers)),
            other => self.extra.get(other).cloned(),
        }
    }

    /// True when the column holds a non-empty value
    pub fn has_field(&self, column: &str) -> bool {
        self.field(column)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    }
}

pub(crate) fn join_values(values: &[String]) -> String {
    let separator = VALUE_SEPARATOR.to_string();
    values.join(&separator)
}

pub(crate) fn split_values(cell: &str) -> Vec<String> {
    cell.split(VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
