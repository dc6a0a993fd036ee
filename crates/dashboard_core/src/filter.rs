use crate::Record;

/// Keeps the records where any of `fields` contains `term`, ignoring case.
///
/// The term is trimmed first; an empty term keeps every record in order.
pub fn filter_records(records: &[Record], term: &str, fields: &[&str]) -> Vec<Record> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| matches(record, &needle, fields))
        .cloned()
        .collect()
}

fn matches(record: &Record, needle: &str, fields: &[&str]) -> bool {
    fields.iter().any(|field| {
        record
            .text(field)
            .unwrap_or_default()
            .to_lowercase()
            .contains(needle)
    })
}
