//! `dashboard.ron`: service URLs, poll timings and page defaults.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use dashboard_core::{Service, Target, DEFAULT_PAGE_SIZE};
use dashboard_engine::{ApiError, ClientSettings, Endpoints, PollPlan, PollSettings};
use dashboard_logging::dash_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CALENDAR_ORDER: [&str; 6] = [
    "Nikolaus Besuch",
    "Weihnachtsmann Besuch",
    "Osterhase Besuch",
    "Kindergeburtstag",
    "Zauberer",
    "Clown",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unknown target {0:?} in poll overrides")]
    UnknownTarget(String),
    #[error("invalid service url: {0}")]
    ServiceUrl(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceUrls {
    pub auth: String,
    pub artists: String,
    pub events: String,
    pub email: String,
    pub logs: String,
}

impl Default for ServiceUrls {
    fn default() -> Self {
        Self {
            auth: "http://localhost:3000/auth".to_string(),
            artists: "http://localhost:3001/artists".to_string(),
            events: "http://localhost:3002/events".to_string(),
            email: "http://localhost:8080".to_string(),
            logs: "http://localhost:3004".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollTiming {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            max_attempts: 24,
        }
    }
}

impl From<PollTiming> for PollSettings {
    fn from(timing: PollTiming) -> Self {
        PollSettings {
            interval: Duration::from_millis(timing.interval_ms),
            max_attempts: timing.max_attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub default: PollTiming,
    /// Keyed by target name, e.g. `"unassigned_events"`.
    pub overrides: BTreeMap<String, PollTiming>,
}

impl Default for PollConfig {
    fn default() -> Self {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Target::UnassignedEvents.name().to_string(),
            PollTiming {
                interval_ms: 5_000,
                ..PollTiming::default()
            },
        );
        Self {
            default: PollTiming::default(),
            overrides,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub services: ServiceUrls,
    pub polling: PollConfig,
    pub page_size: usize,
    pub calendar_order: Vec<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub session_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            services: ServiceUrls::default(),
            polling: PollConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            calendar_order: CALENDAR_ORDER.iter().map(|c| c.to_string()).collect(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            session_file: PathBuf::from("./.dashboard_session.ron"),
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                dash_info!("no config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = ron::from_str(content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        // Reject typos in target names up front.
        config.poll_plan()?;
        Ok(config)
    }

    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        let urls = &self.services;
        Ok(Endpoints::new()
            .with_base(Service::Auth, &urls.auth)?
            .with_base(Service::Artists, &urls.artists)?
            .with_base(Service::Events, &urls.events)?
            .with_base(Service::Email, &urls.email)?
            .with_base(Service::Logs, &urls.logs)?)
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn poll_plan(&self) -> Result<PollPlan, ConfigError> {
        let mut plan = PollPlan::new(self.polling.default.into());
        for (name, timing) in &self.polling.overrides {
            let target =
                Target::from_str(name).map_err(|_| ConfigError::UnknownTarget(name.clone()))?;
            plan = plan.with(target, (*timing).into());
        }
        Ok(plan)
    }
}
