use super::CompanyRecord;
use std::collections::HashMap;

/// Folds per-domain findings into the existing records
///
/// Records are keyed by lower-cased domain; when `existing` lists a domain
/// twice the first record wins. Only empty address, phone and social fields
/// are filled. Updates for domains not in `existing` are dropped. The result
/// keeps the order of `existing`.
pub fn merge_records(existing: Vec<CompanyRecord>, updates: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
    let mut merged: Vec<CompanyRecord> = Vec::with_capacity(existing.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in existing {
        let key = record.key();
        if index.contains_key(&key) {
            tracing::debug!("Dropping duplicate record for {}", record.domain);
            continue;
        }
        index.insert(key, merged.len());
        merged.push(record);
    }

    for update in updates {
        let Some(&position) = index.get(&update.key()) else {
            tracing::debug!("Dropping update for unknown domain {}", update.domain);
            continue;
        };
        let target = &mut merged[position];

        if target.physical_addresses.is_empty() {
            target.physical_addresses = update.physical_addresses;
        }
        if target.phone_numbers.is_empty() {
            target.phone_numbers = update.phone_numbers;
        }
        if target.social_media_links.is_empty() {
            target.social_media_links = update.social_media_links;
        }
    }

    merged
}
