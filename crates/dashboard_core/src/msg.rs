use crate::{CycleToken, Record};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Page opened or the user asked for fresh data.
    RefreshRequested,
    /// User edited the search box (already debounced by the input layer).
    SearchChanged(String),
    /// User moved a group's pagination control.
    PageSelected { group: String, page: usize },
    /// The poller is still waiting for the backend.
    PollProgress { cycle: CycleToken, attempts: u32 },
    /// A fetch cycle ended with data; `timed_out` marks a best-effort answer.
    FetchSettled {
        cycle: CycleToken,
        records: Vec<Record>,
        timed_out: bool,
    },
    /// A fetch cycle failed on transport or HTTP level.
    FetchFailed { cycle: CycleToken, message: String },
    /// The page is going away; pending work must stop.
    Closed,
    /// Render tick.
    Tick,
    NoOp,
}
