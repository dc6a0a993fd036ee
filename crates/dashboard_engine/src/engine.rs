use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use dashboard_core::{progress_percent, CycleToken, Target};
use dashboard_logging::{dash_debug, dash_info, dash_warn, in_page_context};

use crate::coordinator::{CycleCoordinator, CycleTicket};
use crate::poller::{fetch_with_polling, is_loading, PollSettings};
use crate::{records_from_payload, ApiError, DashboardApi, EngineEvent, LoadOutcome};

/// Poll settings per target. Event pages have historically used different
/// intervals, so nothing assumes a uniform timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPlan {
    fallback: PollSettings,
    overrides: HashMap<Target, PollSettings>,
}

impl PollPlan {
    pub fn new(fallback: PollSettings) -> Self {
        Self {
            fallback,
            overrides: HashMap::new(),
        }
    }

    pub fn with(mut self, target: Target, settings: PollSettings) -> Self {
        self.overrides.insert(target, settings);
        self
    }

    pub fn settings_for(&self, target: Target) -> PollSettings {
        self.overrides.get(&target).copied().unwrap_or(self.fallback)
    }
}

impl Default for PollPlan {
    fn default() -> Self {
        Self::new(PollSettings::default()).with(
            Target::UnassignedEvents,
            PollSettings {
                interval: Duration::from_secs(5),
                ..PollSettings::default()
            },
        )
    }
}

struct EngineCommand {
    ticket: CycleTicket,
}

/// Runs polling cycles on a background tokio runtime.
///
/// Commands go in through [`EngineHandle::load`] and [`EngineHandle::cancel`];
/// progress and results come back through [`EngineHandle::try_recv`].
/// Events are only emitted for the live cycle of a target.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    coordinator: Arc<CycleCoordinator>,
}

impl EngineHandle {
    pub fn new(api: DashboardApi, plan: PollPlan) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let coordinator = Arc::new(CycleCoordinator::new());
        let worker_coordinator = coordinator.clone();

        thread::Builder::new()
            .name("dashboard-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let api = api.clone();
                    let settings = plan.settings_for(command.ticket.target);
                    let coordinator = worker_coordinator.clone();
                    let event_tx = event_tx.clone();
                    let page = command.ticket.target.name();
                    runtime.spawn(in_page_context(page, async move {
                        run_cycle(api, settings, command.ticket, coordinator, event_tx).await;
                    }));
                }
                dash_debug!("engine command channel closed");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            coordinator,
        })
    }

    /// Starts a cycle for `target`, cancelling whatever cycle it had running.
    pub fn load(&self, target: Target, cycle: CycleToken) {
        let ticket = self.coordinator.begin(target, cycle);
        if self.cmd_tx.send(EngineCommand { ticket }).is_err() {
            dash_warn!("engine worker is gone; dropping load of {}", target);
        }
    }

    pub fn cancel(&self, target: Target) {
        if self.coordinator.cancel(target) {
            dash_info!("cancelled pending load of {}", target);
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.coordinator.cancel_all();
    }
}

async fn run_cycle(
    api: DashboardApi,
    settings: PollSettings,
    ticket: CycleTicket,
    coordinator: Arc<CycleCoordinator>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let target = ticket.target;
    let cycle = ticket.cycle;
    let api = &api;

    let polled = fetch_with_polling(
        move || api.fetch_target(target),
        &settings,
        &ticket.cancel,
        |attempts| {
            if coordinator.is_current(&ticket) {
                let _ = event_tx.send(EngineEvent::Progress {
                    target,
                    cycle,
                    attempts,
                    percent: progress_percent(attempts),
                });
            }
        },
    )
    .await;

    let result: Result<LoadOutcome, ApiError> = polled.and_then(|polled| {
        // A page that never left `loading` shows as empty rather than failed.
        let records = if polled.timed_out && is_loading(&polled.payload) {
            Vec::new()
        } else {
            records_from_payload(polled.payload)?
        };
        Ok(LoadOutcome {
            records,
            attempts: polled.attempts,
            timed_out: polled.timed_out,
            warning: polled.warning,
        })
    });

    if !coordinator.is_current(&ticket) {
        dash_debug!("dropping result of stale cycle {:?} for {}", cycle, target);
        return;
    }
    coordinator.finish(&ticket);

    match &result {
        Ok(outcome) => dash_info!(
            "{} loaded {} records after {} retries{}",
            target,
            outcome.records.len(),
            outcome.attempts,
            if outcome.timed_out { " (timed out)" } else { "" }
        ),
        Err(err) => dash_warn!("{} failed to load: {}", target, err),
    }
    let _ = event_tx.send(EngineEvent::Completed {
        target,
        cycle,
        result,
    });
}
