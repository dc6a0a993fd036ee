//! Dashboard core: pure data pipeline and page state machine.
mod effect;
mod filter;
mod group;
mod msg;
mod paginate;
mod poll;
mod record;
mod state;
mod target;
mod update;
pub mod validate;
mod view_model;

pub use effect::Effect;
pub use filter::filter_records;
pub use group::{counts_by_group_and_subkey, group_by, GroupOrder, GroupedView, SubkeyCounts};
pub use msg::Msg;
pub use paginate::{clamp_page, page_count, paginate};
pub use poll::{progress_percent, CycleToken, PollState, PollStatus, PollStep};
pub use record::{Record, DEFAULT_GROUP_KEY};
pub use state::{PageState, Phase, DEFAULT_PAGE_SIZE};
pub use target::{Service, Target};
pub use update::update;
pub use validate::{NewArtist, ValidationError};
pub use view_model::{GroupView, PageViewModel};
