use super::{
    CompanyRecord, ALL_NAMES, COMMERCIAL_NAME, DOMAIN, LEGAL_NAME, MERGEABLE_FIELDS,
};
use crate::SweepError;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Column set of the output dataset
///
/// `domain` comes first, then the name columns that appear in `columns` or
/// that some record fills, then every other roster column in sorted order,
/// then the three crawl result columns (always present). `columns` is the
/// roster header row, so a column whose cells are all empty survives.
pub fn dataset_headers(columns: &[String], records: &[CompanyRecord]) -> Vec<String> {
    let mut headers = vec![DOMAIN.to_string()];

    for column in [COMMERCIAL_NAME, LEGAL_NAME, ALL_NAMES] {
        let declared = columns.iter().any(|c| c == column);
        if declared || records.iter().any(|record| record.has_field(column)) {
            headers.push(column.to_string());
        }
    }

    let known: BTreeSet<&str> = [DOMAIN, COMMERCIAL_NAME, LEGAL_NAME, ALL_NAMES]
        .into_iter()
        .chain(MERGEABLE_FIELDS)
        .collect();
    let extras: BTreeSet<&String> = columns
        .iter()
        .filter(|c| !known.contains(c.as_str()))
        .chain(records.iter().flat_map(|r| r.extra.keys()))
        .collect();
    headers.extend(extras.into_iter().cloned());

    headers.extend(MERGEABLE_FIELDS.iter().map(|f| f.to_string()));
    headers
}

/// Writes `records` as CSV to any writer
pub fn write_dataset_to<W: Write>(
    writer: W,
    columns: &[String],
    records: &[CompanyRecord],
) -> Result<(), csv::Error> {
    let headers = dataset_headers(columns, records);
    let mut writer = csv::WriterBuilder::new().from_writer(writer);

    writer.write_record(&headers)?;
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|column| record.field(column).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Atomically replaces the dataset at `path`
///
/// The rows are written to a temporary file in the target directory, which
/// is then renamed over `path`.
pub fn write_dataset(
    path: &Path,
    columns: &[String],
    records: &[CompanyRecord],
) -> Result<(), SweepError> {
    let target = path.display().to_string();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(directory)?;
    write_dataset_to(&mut temp, columns, records).map_err(|e| SweepError::Csv {
        path: target.clone(),
        source: e,
    })?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| SweepError::Persist {
        path: target.clone(),
        message: e.to_string(),
    })?;

    tracing::info!("Wrote {} record(s) to {}", records.len(), target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{
        read_roster, read_roster_from, PHONE_NUMBERS, PHYSICAL_ADDRESSES, SOCIAL_MEDIA_LINKS,
    };
    use tempfile::TempDir;

    fn sample() -> Vec<CompanyRecord> {
        let mut acme = CompanyRecord::new("acme.com");
        acme.commercial_name = Some("Acme".to_string());
        acme.phone_numbers = vec!["(415) 626-4474".to_string(), "0800 123 4567".to_string()];
        acme.extra.insert("country".to_string(), "US".to_string());

        let mut beta = CompanyRecord::new("beta.io");
        beta.extra.insert("city".to_string(), "Austin".to_string());

        vec![acme, beta]
    }

    #[test]
    fn test_headers_union() {
        assert_eq!(
            dataset_headers(&[], &sample()),
            vec![
                DOMAIN,
                COMMERCIAL_NAME,
                "city",
                "country",
                PHYSICAL_ADDRESSES,
                SOCIAL_MEDIA_LINKS,
                PHONE_NUMBERS,
            ]
        );
    }

    #[test]
    fn test_headers_always_include_crawl_fields() {
        let headers = dataset_headers(&[], &[]);
        assert_eq!(headers.len(), 4);
        assert_eq!(headers[0], DOMAIN);
    }

    #[test]
    fn test_write_dataset_rows() {
        let mut out = Vec::new();
        write_dataset_to(&mut out, &[], &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "domain,company_commercial_name,city,country,physical_addresses,social_media_links,phone_numbers"
        );
        assert_eq!(lines[1], "acme.com,Acme,,US,,,(415) 626-4474|0800 123 4567");
        assert_eq!(lines[2], "beta.io,,Austin,,,,");
    }

    #[test]
    fn test_atomic_write_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("companies.csv");
        std::fs::write(&path, "stale").unwrap();

        write_dataset(&path, &[], &sample()).unwrap();

        let records = read_roster(&path).unwrap().records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].phone_numbers.len(), 2);
        assert_eq!(records[1].extra.get("city").map(String::as_str), Some("Austin"));

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_headers_keep_empty_roster_columns() {
        let roster = read_roster_from(
            "domain,company_legal_name,region\nacme.com,,\n".as_bytes(),
            "test.csv",
        )
        .unwrap();

        assert_eq!(
            dataset_headers(&roster.columns, &roster.records),
            vec![
                DOMAIN,
                LEGAL_NAME,
                "region",
                PHYSICAL_ADDRESSES,
                SOCIAL_MEDIA_LINKS,
                PHONE_NUMBERS,
            ]
        );

        let mut out = Vec::new();
        write_dataset_to(&mut out, &roster.columns, &roster.records).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("domain,company_legal_name,region,physical_addresses,social_media_links,phone_numbers")
        );
    }
}
