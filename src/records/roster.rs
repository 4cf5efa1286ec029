use super::{
    split_values, CompanyRecord, ALL_NAMES, COMMERCIAL_NAME, DOMAIN, LEGAL_NAME,
    PHONE_NUMBERS, PHYSICAL_ADDRESSES, SOCIAL_MEDIA_LINKS,
};
use crate::SweepError;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Records of a roster file together with its header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    /// Header names in file order, including columns every row leaves empty
    pub columns: Vec<String>,
    pub records: Vec<CompanyRecord>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads the domain roster CSV at `path`
///
/// Rows with an empty domain are skipped and a domain that appears more than
/// once (ignoring case) keeps its first row.
pub fn read_roster(path: &Path) -> Result<Roster, SweepError> {
    let file = std::fs::File::open(path)?;
    read_roster_from(file, &path.display().to_string())
}

/// Reads a roster from any reader; `source` names it in errors and logs
pub fn read_roster_from<R: Read>(reader: R, source: &str) -> Result<Roster, SweepError> {
    let csv_error = |e: csv::Error| SweepError::Csv {
        path: source.to_string(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if !headers.iter().any(|h| h == DOMAIN) {
        return Err(SweepError::MissingDomainColumn {
            path: source.to_string(),
        });
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped_empty = 0usize;
    let mut skipped_duplicate = 0usize;

    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        let mut record = CompanyRecord::default();

        for (column, value) in headers.iter().zip(row.iter()) {
            apply_cell(&mut record, column, value);
        }

        if record.domain.is_empty() {
            skipped_empty += 1;
            continue;
        }
        if !seen.insert(record.key()) {
            tracing::debug!("Duplicate roster domain {} dropped", record.domain);
            skipped_duplicate += 1;
            continue;
        }

        records.push(record);
    }

    tracing::info!(
        "Read {} domain(s) from {} ({} empty, {} duplicate skipped)",
        records.len(),
        source,
        skipped_empty,
        skipped_duplicate
    );

    Ok(Roster {
        columns: headers,
        records,
    })
}

fn apply_cell(record: &mut CompanyRecord, column: &str, value: &str) {
    let value = value.trim();
    let optional = || (!value.is_empty()).then(|| value.to_string());

    match column {
        DOMAIN => record.domain = value.to_string(),
        COMMERCIAL_NAME => record.commercial_name = optional(),
        LEGAL_NAME => record.legal_name = optional(),
        ALL_NAMES => record.all_names = split_values(value),
        PHYSICAL_ADDRESSES => record.physical_addresses = split_values(value),
        SOCIAL_MEDIA_LINKS => record.social_media_links = split_values(value),
        PHONE_NUMBERS => record.phone_numbers = split_values(value),
        other => {
            record.extra.insert(other.to_string(), value.to_string());
        }
    }
}
