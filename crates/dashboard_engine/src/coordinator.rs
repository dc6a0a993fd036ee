use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use dashboard_core::{CycleToken, Target};
use tokio_util::sync::CancellationToken;

/// Handle for one running polling cycle.
#[derive(Debug, Clone)]
pub struct CycleTicket {
    pub target: Target,
    pub cycle: CycleToken,
    pub cancel: CancellationToken,
}

/// Tracks the single live polling cycle per target.
///
/// Beginning a cycle cancels the previous one for the same target, so a
/// continuation scheduled by an older cycle can never overwrite newer data.
#[derive(Debug, Default)]
pub struct CycleCoordinator {
    live: Mutex<HashMap<Target, (CycleToken, CancellationToken)>>,
}

impl CycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> MutexGuard<'_, HashMap<Target, (CycleToken, CancellationToken)>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `cycle` as the live cycle of `target`.
    ///
    /// A cycle older than the live one is born cancelled.
    pub fn begin(&self, target: Target, cycle: CycleToken) -> CycleTicket {
        let cancel = CancellationToken::new();
        let mut live = self.live();
        let stale = live
            .get(&target)
            .is_some_and(|(current, _)| *current > cycle);
        if stale {
            cancel.cancel();
        } else if let Some((_, previous)) = live.insert(target, (cycle, cancel.clone())) {
            previous.cancel();
        }
        CycleTicket {
            target,
            cycle,
            cancel,
        }
    }

    /// Cancels the live cycle of `target`, if any. Returns whether one was live.
    pub fn cancel(&self, target: Target) -> bool {
        match self.live().remove(&target) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, (_, token)) in self.live().drain() {
            token.cancel();
        }
    }

    pub fn is_current(&self, ticket: &CycleTicket) -> bool {
        !ticket.cancel.is_cancelled()
            && self
                .live()
                .get(&ticket.target)
                .is_some_and(|(cycle, _)| *cycle == ticket.cycle)
    }

    /// Drops the bookkeeping for a finished cycle if it is still the live one.
    pub fn finish(&self, ticket: &CycleTicket) {
        let mut live = self.live();
        if live
            .get(&ticket.target)
            .is_some_and(|(cycle, _)| *cycle == ticket.cycle)
        {
            live.remove(&ticket.target);
        }
    }
}
