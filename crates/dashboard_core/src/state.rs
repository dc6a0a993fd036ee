use std::collections::{BTreeMap, BTreeSet};

use crate::view_model::{GroupView, PageViewModel};
use crate::{
    clamp_page, counts_by_group_and_subkey, filter_records, page_count, paginate, progress_percent,
    CycleToken, GroupOrder, GroupedView, Record, Target, DEFAULT_GROUP_KEY,
};

pub const DEFAULT_PAGE_SIZE: usize = 10;

const TIMEOUT_BANNER: &str =
    "Zeitüberschreitung beim Laden. Es werden die zuletzt erhaltenen Daten angezeigt.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    LoadingTimeout,
    Error,
}

impl Phase {
    /// Loaded, LoadingTimeout and Error end a load; only a refresh leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Loaded | Phase::LoadingTimeout | Phase::Error)
    }
}

/// State of one dashboard page: fetched records, search term and per-group pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    target: Target,
    phase: Phase,
    cycle: CycleToken,
    attempts: u32,
    records: Vec<Record>,
    search: String,
    pages: BTreeMap<String, usize>,
    page_size: usize,
    calendar_order: Vec<String>,
    banner: Option<String>,
    dirty: bool,
}

impl PageState {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            phase: Phase::Idle,
            cycle: CycleToken::default(),
            attempts: 0,
            records: Vec::new(),
            search: String::new(),
            pages: BTreeMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            calendar_order: Vec::new(),
            banner: None,
            dirty: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fixed section order for calendar-grouped pages.
    pub fn with_calendar_order(mut self, order: Vec<String>) -> Self {
        self.calendar_order = order;
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle(&self) -> CycleToken {
        self.cycle
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn group_order(&self) -> GroupOrder {
        if self.target.uses_calendar_order() && !self.calendar_order.is_empty() {
            GroupOrder::Canonical(self.calendar_order.clone())
        } else {
            GroupOrder::Alphabetical
        }
    }

    /// Records matching the current search, grouped by the page's key.
    ///
    /// Every group present in the unfiltered records is kept, possibly empty.
    pub fn grouped(&self) -> GroupedView {
        let field = self.target.group_field();
        let keys: BTreeSet<String> = self
            .records
            .iter()
            .map(|r| r.key(field).unwrap_or_else(|| DEFAULT_GROUP_KEY.to_string()))
            .collect();
        let filtered = filter_records(&self.records, &self.search, self.target.search_fields());
        let mut view = GroupedView::seeded(keys);
        view.extend_by(&filtered, |r| r.key(field), DEFAULT_GROUP_KEY);
        view
    }

    pub fn view(&self) -> PageViewModel {
        let grouped = self.grouped();
        let badge_field = self.target.badge_field();
        let order = self.group_order();

        let groups = grouped
            .ordered_keys(&order)
            .into_iter()
            .map(|key| {
                let records = grouped.get(key).unwrap_or_default();
                let page = self.page_for(key, records.len());
                let badges = counts_by_group_and_subkey(
                    records,
                    |_| Some(key.to_string()),
                    |r| r.key(badge_field),
                )
                .remove(key)
                .unwrap_or_default();
                GroupView {
                    key: key.to_string(),
                    total: records.len(),
                    page,
                    page_count: page_count(records.len(), self.page_size),
                    rows: paginate(records, self.page_size, page).to_vec(),
                    badges,
                }
            })
            .collect();

        PageViewModel {
            target: self.target,
            phase: self.phase,
            progress: progress_percent(self.attempts),
            banner: self.banner.clone(),
            search: self.search.clone(),
            total_records: self.records.len(),
            matching_records: grouped.record_count(),
            groups,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn page_for(&self, key: &str, len: usize) -> usize {
        let page = self.pages.get(key).copied().unwrap_or(1);
        clamp_page(page, len, self.page_size)
    }

    pub(crate) fn is_current(&self, cycle: CycleToken) -> bool {
        cycle == self.cycle && self.phase == Phase::Loading
    }

    pub(crate) fn begin_cycle(&mut self) -> CycleToken {
        self.cycle = self.cycle.next();
        self.phase = Phase::Loading;
        self.attempts = 0;
        self.banner = None;
        self.dirty = true;
        self.cycle
    }

    pub(crate) fn apply_progress(&mut self, attempts: u32) {
        if self.attempts != attempts {
            self.attempts = attempts;
            self.dirty = true;
        }
    }

    pub(crate) fn apply_settled(&mut self, records: Vec<Record>, timed_out: bool) {
        self.records = records;
        self.pages.clear();
        if timed_out {
            self.phase = Phase::LoadingTimeout;
            self.banner = Some(TIMEOUT_BANNER.to_string());
        } else {
            self.phase = Phase::Loaded;
            self.banner = None;
        }
        self.dirty = true;
    }

    pub(crate) fn apply_failed(&mut self, message: &str) {
        self.phase = Phase::Error;
        self.banner = Some(format!("Fehler beim Laden der Daten: {message}"));
        self.dirty = true;
    }

    pub(crate) fn set_search(&mut self, term: String) {
        if self.search != term {
            self.search = term;
            self.pages.clear();
            self.dirty = true;
        }
    }

    pub(crate) fn select_page(&mut self, group: String, page: usize) {
        let len = self.grouped().get(&group).map_or(0, <[Record]>::len);
        let page = clamp_page(page, len, self.page_size);
        if self.pages.insert(group, page) != Some(page) {
            self.dirty = true;
        }
    }

    /// Invalidates the running cycle; returns whether one was pending.
    pub(crate) fn close(&mut self) -> bool {
        let was_loading = self.phase == Phase::Loading;
        self.cycle = self.cycle.next();
        if was_loading {
            self.phase = Phase::Idle;
            self.dirty = true;
        }
        was_loading
    }
}
