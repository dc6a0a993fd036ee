use std::collections::BTreeMap;

use serde::Serialize;

use crate::Record;

/// Group → subkey → number of records.
pub type SubkeyCounts = BTreeMap<String, BTreeMap<String, usize>>;

/// Records partitioned by a categorical key.
///
/// Every record pushed lands in exactly one group. Groups iterate in key
/// order; use [`GroupedView::ordered_keys`] for display order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct GroupedView {
    groups: BTreeMap<String, Vec<Record>>,
}

/// Display order for group sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupOrder {
    #[default]
    Alphabetical,
    /// Listed keys first, in list order; any other keys follow alphabetically.
    Canonical(Vec<String>),
}

impl GroupedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a view that already contains an empty group for each key.
    pub fn seeded<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups = keys.into_iter().map(|k| (k.into(), Vec::new())).collect();
        Self { groups }
    }

    pub fn push(&mut self, key: impl Into<String>, record: Record) {
        self.groups.entry(key.into()).or_default().push(record);
    }

    /// Appends each record to the group named by `key_fn`, or `default_key`.
    pub fn extend_by<F>(&mut self, records: &[Record], key_fn: F, default_key: &str)
    where
        F: Fn(&Record) -> Option<String>,
    {
        for record in records {
            let key = key_fn(record).unwrap_or_else(|| default_key.to_string());
            self.push(key, record.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&[Record]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn ordered_keys(&self, order: &GroupOrder) -> Vec<&str> {
        match order {
            GroupOrder::Alphabetical => self.keys().collect(),
            GroupOrder::Canonical(canonical) => {
                let mut keys: Vec<&str> = canonical
                    .iter()
                    .filter_map(|name| self.groups.get_key_value(name).map(|(k, _)| k.as_str()))
                    .collect();
                keys.extend(self.keys().filter(|k| !canonical.iter().any(|c| c == k)));
                keys
            }
        }
    }
}

/// Partitions `records` by `key_fn`, falling back to `default_key`.
pub fn group_by<F>(records: &[Record], key_fn: F, default_key: &str) -> GroupedView
where
    F: Fn(&Record) -> Option<String>,
{
    let mut view = GroupedView::new();
    view.extend_by(records, key_fn, default_key);
    view
}

/// Counts records per group and per subkey; records missing either key are skipped.
pub fn counts_by_group_and_subkey<G, S>(records: &[Record], group_fn: G, sub_fn: S) -> SubkeyCounts
where
    G: Fn(&Record) -> Option<String>,
    S: Fn(&Record) -> Option<String>,
{
    let mut counts = SubkeyCounts::new();
    for record in records {
        let (Some(group), Some(sub)) = (group_fn(record), sub_fn(record)) else {
            continue;
        };
        *counts.entry(group).or_default().entry(sub).or_default() += 1;
    }
    counts
}
