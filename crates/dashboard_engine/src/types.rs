use std::fmt;

use dashboard_core::{CycleToken, Record, Target};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The backend answered `loading` and another attempt is scheduled.
    Progress {
        target: Target,
        cycle: CycleToken,
        attempts: u32,
        percent: u8,
    },
    Completed {
        target: Target,
        cycle: CycleToken,
        result: Result<LoadOutcome, ApiError>,
    },
}

/// Records delivered by a finished polling cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub records: Vec<Record>,
    pub attempts: u32,
    pub timed_out: bool,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "polling cycle superseded")
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Decode, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// No response was received.
    Network,
    HttpStatus(u16),
    /// The transport timeout fired.
    Timeout,
    /// The body was not the JSON shape the caller expected.
    Decode,
    /// No base URL is configured for the endpoint's service.
    UnknownEndpoint,
    /// The form failed a local check; nothing was sent.
    Validation,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Decode => write!(f, "unexpected response"),
            FailureKind::UnknownEndpoint => write!(f, "unknown endpoint"),
            FailureKind::Validation => write!(f, "validation failed"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl From<dashboard_core::ValidationError> for ApiError {
    fn from(err: dashboard_core::ValidationError) -> Self {
        ApiError::new(FailureKind::Validation, err.to_string())
    }
}
