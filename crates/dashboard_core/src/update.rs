use crate::{Effect, Msg, PageState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PageState, msg: Msg) -> (PageState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested => {
            // A refresh supersedes a pending cycle; the engine cancels it when the
            // new cycle for the same target begins.
            let cycle = state.begin_cycle();
            vec![Effect::Fetch {
                target: state.target(),
                cycle,
            }]
        }
        Msg::SearchChanged(term) => {
            state.set_search(term);
            Vec::new()
        }
        Msg::PageSelected { group, page } => {
            state.select_page(group, page);
            Vec::new()
        }
        Msg::PollProgress { cycle, attempts } => {
            if state.is_current(cycle) {
                state.apply_progress(attempts);
            }
            Vec::new()
        }
        Msg::FetchSettled {
            cycle,
            records,
            timed_out,
        } => {
            if state.is_current(cycle) {
                state.apply_settled(records, timed_out);
            }
            Vec::new()
        }
        Msg::FetchFailed { cycle, message } => {
            if state.is_current(cycle) {
                state.apply_failed(&message);
            }
            Vec::new()
        }
        Msg::Closed => {
            if state.close() {
                vec![Effect::Cancel {
                    target: state.target(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
