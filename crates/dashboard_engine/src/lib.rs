//! Dashboard engine: backend IO, polling and effect execution.
mod api;
mod client;
mod coordinator;
mod endpoints;
mod engine;
mod persist;
mod poller;
mod types;

pub use api::{records_from_payload, CurrentUser, DashboardApi, LogsResponse};
pub use client::{ApiClient, ApiResponse, ClientSettings, ReqwestApiClient};
pub use coordinator::{CycleCoordinator, CycleTicket};
pub use endpoints::{Endpoint, Endpoints};
pub use engine::{EngineHandle, PollPlan};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poller::{fetch_with_polling, is_loading, PollSettings, Polled, TIMEOUT_WARNING};
pub use types::{ApiError, EngineEvent, FailureKind, LoadOutcome};
