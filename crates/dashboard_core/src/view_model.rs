use std::collections::BTreeMap;

use crate::{Phase, Record, Target};

#[derive(Debug, Clone, PartialEq)]
pub struct PageViewModel {
    pub target: Target,
    pub phase: Phase,
    /// Poll progress in percent while loading.
    pub progress: u8,
    /// User-facing notice (German), e.g. a load error or timeout warning.
    pub banner: Option<String>,
    pub search: String,
    pub total_records: usize,
    pub matching_records: usize,
    pub groups: Vec<GroupView>,
    pub dirty: bool,
}

impl PageViewModel {
    pub fn group(&self, key: &str) -> Option<&GroupView> {
        self.groups.iter().find(|g| g.key == key)
    }
}

/// One group section with its current page of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupView {
    pub key: String,
    /// Matching records in the group across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub rows: Vec<Record>,
    /// Counts of the page's badge field (role, status, level) within the group.
    pub badges: BTreeMap<String, usize>,
}
