use std::time::{Duration, Instant};

use dashboard_core::{update, Effect, Msg, PageState, PageViewModel, Target};
use dashboard_engine::{EngineEvent, EngineHandle, FailureKind};
use dashboard_logging::{clear_page_context, dash_debug, dash_info, dash_warn, set_page_context};

const RECV_SLICE: Duration = Duration::from_millis(100);

/// Feeds one page's [`PageState`] through `update`, executing its effects on the engine.
pub struct PageRunner<'a> {
    engine: &'a EngineHandle,
    state: PageState,
}

impl<'a> PageRunner<'a> {
    pub fn new(engine: &'a EngineHandle, state: PageState) -> Self {
        set_page_context(state.target().name());
        Self { engine, state }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn view(&self) -> PageViewModel {
        self.state.view()
    }

    /// Applies `msg`; returns whether the page changed visibly.
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        let target = self.state.target();
        let state = std::mem::replace(&mut self.state, PageState::new(target));
        let (state, effects) = update(state, msg);
        self.state = state;
        self.run_effects(effects);
        self.state.consume_dirty()
    }

    /// Refreshes the page and blocks until the load ends or `deadline` passes.
    ///
    /// `on_view` sees every visible change while loading.
    pub fn load(
        &mut self,
        deadline: Duration,
        mut on_view: impl FnMut(&PageViewModel),
    ) -> anyhow::Result<()> {
        let started = Instant::now();
        if self.dispatch(Msg::RefreshRequested) {
            on_view(&self.view());
        }

        while !self.state.phase().is_terminal() {
            if started.elapsed() > deadline {
                self.dispatch(Msg::Closed);
                anyhow::bail!(
                    "{} did not finish loading within {:?}",
                    self.state.target(),
                    deadline
                );
            }
            let Some(event) = self.engine.recv_timeout(RECV_SLICE) else {
                continue;
            };
            let (target, msg) = event_to_msg(event);
            if target != self.state.target() {
                dash_debug!("ignoring event for {}", target);
                continue;
            }
            if self.dispatch(msg) {
                on_view(&self.view());
            }
        }
        Ok(())
    }

    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Fetch { target, cycle } => {
                    dash_info!("Fetch target={} cycle={:?}", target, cycle);
                    self.engine.load(target, cycle);
                }
                Effect::Cancel { target } => self.engine.cancel(target),
            }
        }
    }
}

impl Drop for PageRunner<'_> {
    fn drop(&mut self) {
        if self.state.phase() == dashboard_core::Phase::Loading {
            self.dispatch(Msg::Closed);
        }
        clear_page_context();
    }
}

/// Translates an engine event into the message for its page.
pub fn event_to_msg(event: EngineEvent) -> (Target, Msg) {
    match event {
        EngineEvent::Progress {
            target,
            cycle,
            attempts,
            ..
        } => (target, Msg::PollProgress { cycle, attempts }),
        EngineEvent::Completed {
            target,
            cycle,
            result,
        } => {
            let msg = match result {
                Ok(outcome) => {
                    if let Some(warning) = &outcome.warning {
                        dash_warn!("{}: {}", target, warning);
                    }
                    Msg::FetchSettled {
                        cycle,
                        records: outcome.records,
                        timed_out: outcome.timed_out,
                    }
                }
                Err(err) if err.kind == FailureKind::Cancelled => Msg::NoOp,
                Err(err) => Msg::FetchFailed {
                    cycle,
                    message: err.to_string(),
                },
            };
            (target, msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use dashboard_core::{CycleToken, Phase, Record};
    use dashboard_engine::{
        ApiClient, ApiError, ApiResponse, DashboardApi, Endpoint, LoadOutcome, PollPlan,
        PollSettings,
    };
    use serde_json::{json, Value};

    use super::*;

    /// Answers `loading` for the first `loading_answers` GETs, then `ready`.
    struct ScriptedClient {
        calls: AtomicU32,
        loading_answers: u32,
        ready: Result<Value, ApiError>,
    }

    #[async_trait::async_trait]
    impl ApiClient for ScriptedClient {
        async fn get(&self, _: &Endpoint, _: &[(&str, &str)]) -> Result<ApiResponse, ApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let data = if call < self.loading_answers {
                json!({"status": "loading"})
            } else {
                self.ready.clone()?
            };
            Ok(ApiResponse { status: 200, data })
        }

        async fn post(&self, _: &Endpoint, _: &Value) -> Result<ApiResponse, ApiError> {
            unreachable!("pages only read")
        }

        async fn patch(&self, _: &Endpoint, _: &Value) -> Result<ApiResponse, ApiError> {
            unreachable!("pages only read")
        }

        async fn delete(&self, _: &Endpoint, _: &Value) -> Result<ApiResponse, ApiError> {
            unreachable!("pages only read")
        }
    }

    fn engine_with(loading_answers: u32, ready: Result<Value, ApiError>) -> EngineHandle {
        dashboard_logging::initialize_for_tests();
        let client = Arc::new(ScriptedClient {
            calls: AtomicU32::new(0),
            loading_answers,
            ready,
        });
        let plan = PollPlan::new(PollSettings {
            interval: Duration::from_millis(10),
            max_attempts: 24,
        });
        EngineHandle::new(DashboardApi::new(client), plan).unwrap()
    }

    #[test]
    fn load_reports_progress_then_settles() {
        let engine = engine_with(
            2,
            Ok(json!([
                {"subject": "Anfrage", "type": "booking", "status": "new"},
                {"subject": "Absage", "type": "cancel", "status": "done"}
            ])),
        );
        let mut runner = PageRunner::new(&engine, PageState::new(Target::Emails));

        let mut progress = Vec::new();
        runner
            .load(Duration::from_secs(10), |view| progress.push(view.progress))
            .unwrap();

        assert_eq!(runner.state().phase(), Phase::Loaded);
        assert_eq!(runner.state().records().len(), 2);
        // Refresh, two retries, then the settled page.
        assert_eq!(progress, vec![0, 4, 8, 8]);
    }

    #[test]
    fn http_failure_ends_in_error_phase() {
        let engine = engine_with(
            0,
            Err(ApiError::new(FailureKind::HttpStatus(500), "boom")),
        );
        let mut runner = PageRunner::new(&engine, PageState::new(Target::Logs));
        runner.load(Duration::from_secs(10), |_| {}).unwrap();

        let view = runner.view();
        assert_eq!(view.phase, Phase::Error);
        assert!(view
            .banner
            .unwrap()
            .starts_with("Fehler beim Laden der Daten:"));
    }

    #[test]
    fn completed_events_map_to_settle_or_failure() {
        let cycle = CycleToken(3);
        let (target, msg) = event_to_msg(EngineEvent::Completed {
            target: Target::Artists,
            cycle,
            result: Ok(LoadOutcome {
                records: vec![Record::default()],
                attempts: 24,
                timed_out: true,
                warning: Some("spät".to_string()),
            }),
        });
        assert_eq!(target, Target::Artists);
        assert_eq!(
            msg,
            Msg::FetchSettled {
                cycle,
                records: vec![Record::default()],
                timed_out: true
            }
        );

        let (_, msg) = event_to_msg(EngineEvent::Completed {
            target: Target::Artists,
            cycle,
            result: Err(ApiError::new(FailureKind::Cancelled, "superseded")),
        });
        assert_eq!(msg, Msg::NoOp);
    }
}
