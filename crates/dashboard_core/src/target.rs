use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Backend microservice a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Auth,
    Artists,
    Events,
    Email,
    Logs,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Auth => "auth",
            Service::Artists => "artists",
            Service::Events => "events",
            Service::Email => "email",
            Service::Logs => "logs",
        };
        f.write_str(name)
    }
}

/// One dashboard page's data source together with its pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    UnassignedEvents,
    AssignedEvents,
    EventHistory,
    Emails,
    Messages,
    Artists,
    Logs,
}

impl Target {
    pub const ALL: [Target; 7] = [
        Target::UnassignedEvents,
        Target::AssignedEvents,
        Target::EventHistory,
        Target::Emails,
        Target::Messages,
        Target::Artists,
        Target::Logs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Target::UnassignedEvents => "unassigned_events",
            Target::AssignedEvents => "assigned_events",
            Target::EventHistory => "event_history",
            Target::Emails => "emails",
            Target::Messages => "messages",
            Target::Artists => "artists",
            Target::Logs => "logs",
        }
    }

    pub fn service(self) -> Service {
        match self {
            Target::UnassignedEvents | Target::AssignedEvents | Target::EventHistory => {
                Service::Events
            }
            Target::Emails | Target::Messages => Service::Email,
            Target::Artists => Service::Artists,
            Target::Logs => Service::Logs,
        }
    }

    /// Path of the list endpoint relative to the service base URL.
    pub fn path(self) -> &'static str {
        match self {
            Target::UnassignedEvents => "/unassigned",
            Target::AssignedEvents => "/assigned",
            Target::EventHistory => "/history",
            Target::Emails => "/api/v1/email",
            Target::Messages => "/api/v1/whatsapp",
            Target::Artists => "/",
            Target::Logs => "/logs",
        }
    }

    pub fn group_field(self) -> &'static str {
        match self {
            Target::UnassignedEvents
            | Target::AssignedEvents
            | Target::EventHistory
            | Target::Artists => "calendar",
            Target::Emails | Target::Messages => "type",
            Target::Logs => "service",
        }
    }

    pub fn search_fields(self) -> &'static [&'static str] {
        match self {
            Target::UnassignedEvents => &["summary", "location", "description", "calendar"],
            Target::AssignedEvents => &["summary", "location", "description", "artist"],
            Target::EventHistory => &["summary", "location", "status"],
            Target::Emails => &["subject", "from", "to", "snippet"],
            Target::Messages => &["body", "from", "to"],
            Target::Artists => &["Name", "E-Mail", "calendar", "role"],
            Target::Logs => &["message", "service", "level"],
        }
    }

    /// Secondary field counted per group for the badge line.
    pub fn badge_field(self) -> &'static str {
        match self {
            Target::UnassignedEvents => "missingRole",
            Target::AssignedEvents | Target::Artists => "role",
            Target::EventHistory | Target::Emails | Target::Messages => "status",
            Target::Logs => "level",
        }
    }

    /// Whether groups follow the canonical calendar order instead of the alphabet.
    pub fn uses_calendar_order(self) -> bool {
        self.service() == Service::Events
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Target::ALL
            .into_iter()
            .find(|target| target.name() == wanted)
            .ok_or_else(|| format!("unknown page '{s}'"))
    }
}
