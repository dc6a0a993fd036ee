use std::time::Duration;

/// Identifies one polling cycle. Tokens only grow, so a result tagged with an
/// older token than the page's current one is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CycleToken(pub u64);

impl CycleToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollStatus {
    #[default]
    Idle,
    Polling,
    Settled,
    TimedOut,
}

/// What the driver of a [`PollState`] should do after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// Wait `delay`, then fetch again.
    Retry { attempt: u32, delay: Duration },
    /// Attempts are exhausted: wait `delay`, fetch once more and keep that answer.
    FinalAttempt { delay: Duration },
    /// The cycle is over; keep the last answer.
    Done,
}

/// Attempt bookkeeping for one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    attempts: u32,
    max_attempts: u32,
    interval: Duration,
    status: PollStatus,
}

impl PollState {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            interval,
            status: PollStatus::Idle,
        }
    }

    /// Feeds one response into the machine; `loading` is true when the
    /// payload carried the loading placeholder.
    pub fn observe(&mut self, loading: bool) -> PollStep {
        match self.status {
            PollStatus::Settled | PollStatus::TimedOut => PollStep::Done,
            PollStatus::Idle | PollStatus::Polling => {
                if !loading {
                    self.status = PollStatus::Settled;
                    PollStep::Done
                } else if self.attempts < self.max_attempts {
                    self.attempts += 1;
                    self.status = PollStatus::Polling;
                    PollStep::Retry {
                        attempt: self.attempts,
                        delay: self.interval,
                    }
                } else {
                    self.status = PollStatus::TimedOut;
                    PollStep::FinalAttempt {
                        delay: self.interval,
                    }
                }
            }
        }
    }

    /// Back to `Idle` with a fresh attempt counter (manual refresh).
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.status = PollStatus::Idle;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.attempts)
    }
}

/// Progress shown while polling: four percent per attempt, capped at 100.
pub fn progress_percent(attempts: u32) -> u8 {
    attempts.saturating_mul(4).min(100) as u8
}
