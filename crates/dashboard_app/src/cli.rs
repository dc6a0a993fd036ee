use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dashboard_core::Target;

use crate::logging::LogDestination;

/// Text front end for the KidsKulturSpass admin dashboard.
///
/// Loads dashboard pages from the backend services, waiting out `loading`
/// answers, and prints them grouped by calendar, type or service.
#[derive(Debug, Parser)]
#[command(name = "kks-dashboard", version)]
pub struct Cli {
    /// Path to the RON configuration file.
    #[arg(long, global = true, default_value = "./dashboard.ron")]
    pub config: PathBuf,

    /// Where log output goes.
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Load a page and print its groups.
    ///
    /// Pages: unassigned-events, assigned-events, event-history, emails,
    /// messages, artists, logs.
    Show {
        target: Target,
        #[command(flatten)]
        view: ViewArgs,
        /// Page to show; applies to every group unless `--group` is given.
        #[arg(long)]
        page: Option<usize>,
        /// Only print this group.
        #[arg(long)]
        group: Option<String>,
    },
    /// Load a page and write its grouped records as JSON to `<out>/<page>.json`.
    Export {
        target: Target,
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Manage artists.
    #[command(subcommand)]
    Artist(ArtistCommand),
    /// Password recovery.
    #[command(subcommand)]
    Password(PasswordCommand),
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Case-insensitive search over the page's text fields.
    #[arg(long, default_value = "")]
    pub search: String,
    /// Rows per group page; defaults to the configured size.
    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum ArtistCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        calendar: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        phone: Option<String>,
    },
    Remove {
        #[arg(long)]
        calendar: String,
        #[arg(long)]
        email: String,
    },
    /// List known calendars and roles.
    Options,
}

#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Ask for a reset mail.
    Forgot {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with the token from the reset mail.
    Reset {
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
    },
}
