use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dashboard_core::{Msg, NewArtist, PageState, Phase, Target};
use dashboard_engine::{
    AtomicFileWriter, DashboardApi, EngineHandle, FailureKind, ReqwestApiClient,
};
use dashboard_logging::{dash_info, dash_warn};
use tokio::runtime::Runtime;

use crate::cli::{ArtistCommand, Command, PasswordCommand, ViewArgs};
use crate::config::AppConfig;
use crate::render::{render_page, render_progress};
use crate::runner::PageRunner;
use crate::session::{SessionFlags, SessionStore};

/// Client, typed API and session file, wired from the config.
struct Backend {
    client: Arc<ReqwestApiClient>,
    api: DashboardApi,
    store: SessionStore,
}

impl Backend {
    fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let client = ReqwestApiClient::new(config.endpoints()?, &config.client_settings())?;
        let store = SessionStore::new(config.session_file.clone());
        if let Some(cookie) = store.load().cookie {
            client.restore_session_cookie(&cookie);
        }
        let client = Arc::new(client);
        let api = DashboardApi::new(client.clone());
        Ok(Self { client, api, store })
    }
}

pub fn run(runtime: &Runtime, config: &AppConfig, command: Command) -> anyhow::Result<()> {
    let backend = Backend::connect(config)?;
    match command {
        Command::Login { email, password } => login(runtime, &backend, &email, &password),
        Command::Logout => logout(runtime, &backend),
        Command::Whoami => whoami(runtime, &backend),
        Command::Show {
            target,
            view,
            page,
            group,
        } => show(config, &backend, target, &view, page, group.as_deref()),
        Command::Export { target, out, view } => {
            let path = export(config, &backend, target, &view, out)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Artist(artist) => artist_command(runtime, &backend, artist),
        Command::Password(password) => password_command(runtime, &backend, password),
    }
}

fn login(runtime: &Runtime, backend: &Backend, email: &str, password: &str) -> anyhow::Result<()> {
    runtime
        .block_on(backend.api.login(email, password))
        .context("Anmeldung fehlgeschlagen")?;

    let (name, role) = match runtime.block_on(backend.api.me()) {
        Ok(user) => (user.name, user.role),
        Err(err) => {
            dash_warn!("logged in but /me failed: {}", err);
            (email.trim().to_string(), String::new())
        }
    };
    backend.store.save(&SessionFlags::logged_in(
        name.clone(),
        role.clone(),
        backend.client.session_cookie(),
    ))?;
    println!("Angemeldet als {name} ({role})");
    Ok(())
}

fn logout(runtime: &Runtime, backend: &Backend) -> anyhow::Result<()> {
    if let Err(err) = runtime.block_on(backend.api.logout()) {
        dash_warn!("logout request failed: {}", err);
    }
    backend.store.clear()?;
    println!("Abgemeldet");
    Ok(())
}

fn whoami(runtime: &Runtime, backend: &Backend) -> anyhow::Result<()> {
    match runtime.block_on(backend.api.me()) {
        Ok(user) => {
            let flags = SessionFlags::logged_in(
                user.name.clone(),
                user.role.clone(),
                backend.client.session_cookie(),
            );
            backend.store.save(&flags)?;
            println!("{} <{}> ({})", user.name, user.email, user.role);
            Ok(())
        }
        Err(err) if matches!(err.kind, FailureKind::HttpStatus(401 | 403)) => {
            backend.store.clear()?;
            println!("Nicht angemeldet");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn show(
    config: &AppConfig,
    backend: &Backend,
    target: Target,
    args: &ViewArgs,
    page: Option<usize>,
    group: Option<&str>,
) -> anyhow::Result<()> {
    let engine = EngineHandle::new(backend.api.clone(), config.poll_plan()?)
        .context("starting engine")?;
    let mut runner = open_page(&engine, config, target, args)?;

    if let Some(page) = page {
        let keys: Vec<String> = match group {
            Some(key) => vec![key.to_string()],
            None => runner.view().groups.into_iter().map(|g| g.key).collect(),
        };
        for key in keys {
            runner.dispatch(Msg::PageSelected { group: key, page });
        }
    }

    let view = runner.view();
    print!("{}", render_page(&view, group));
    if view.phase == Phase::Error {
        anyhow::bail!("{} konnte nicht geladen werden", target);
    }
    Ok(())
}

/// Writes the grouped page to `<out>/<page>.json`. A failed load writes nothing.
fn export(
    config: &AppConfig,
    backend: &Backend,
    target: Target,
    args: &ViewArgs,
    out: PathBuf,
) -> anyhow::Result<PathBuf> {
    let engine = EngineHandle::new(backend.api.clone(), config.poll_plan()?)
        .context("starting engine")?;
    let runner = open_page(&engine, config, target, args)?;
    if runner.state().phase() == Phase::Error {
        anyhow::bail!("{} konnte nicht geladen werden", target);
    }
    let writer = AtomicFileWriter::new(out);
    let path = writer.write_json(
        &format!("{}.json", target.name()),
        &runner.state().grouped(),
    )?;
    Ok(path)
}

/// Loads `target` to a terminal phase and applies the search term.
fn open_page<'e>(
    engine: &'e EngineHandle,
    config: &AppConfig,
    target: Target,
    args: &ViewArgs,
) -> anyhow::Result<PageRunner<'e>> {
    let state = PageState::new(target)
        .with_page_size(args.page_size.unwrap_or(config.page_size))
        .with_calendar_order(config.calendar_order.clone());
    let mut runner = PageRunner::new(engine, state);

    runner.load(load_deadline(config, target)?, |view| {
        if view.phase == Phase::Loading && view.progress > 0 {
            eprintln!("{}", render_progress(view.progress));
        }
    })?;
    runner.dispatch(Msg::SearchChanged(args.search.clone()));
    dash_info!(
        "{} shows {} of {} records",
        target,
        runner.view().matching_records,
        runner.state().records().len()
    );
    Ok(runner)
}

/// Upper bound for one polling cycle: every attempt may wait a full interval
/// and run into the request timeout.
fn load_deadline(config: &AppConfig, target: Target) -> anyhow::Result<Duration> {
    let settings = config.poll_plan()?.settings_for(target);
    let attempts = settings.max_attempts.saturating_add(2);
    let per_attempt = settings
        .interval
        .saturating_add(config.client_settings().request_timeout);
    Ok(per_attempt.checked_mul(attempts).unwrap_or(Duration::MAX))
}

fn artist_command(
    runtime: &Runtime,
    backend: &Backend,
    command: ArtistCommand,
) -> anyhow::Result<()> {
    match command {
        ArtistCommand::Add {
            name,
            email,
            calendar,
            role,
            phone,
        } => {
            let artist = NewArtist {
                name,
                email,
                calendar,
                role,
                phone,
            };
            runtime.block_on(backend.api.create_artist(&artist))?;
            println!("Künstler {} angelegt", artist.name);
        }
        ArtistCommand::Remove { calendar, email } => {
            runtime.block_on(backend.api.delete_artist(&calendar, &email))?;
            println!("Künstler {email} aus {calendar} entfernt");
        }
        ArtistCommand::Options => {
            let calendars = runtime.block_on(backend.api.calendars())?;
            let roles = runtime.block_on(backend.api.role_options())?;
            println!("Kalender: {}", calendars.join(", "));
            println!("Rollen: {}", roles.join(", "));
        }
    }
    Ok(())
}

fn password_command(
    runtime: &Runtime,
    backend: &Backend,
    command: PasswordCommand,
) -> anyhow::Result<()> {
    match command {
        PasswordCommand::Forgot { email } => {
            runtime.block_on(backend.api.forgot_password(&email))?;
            println!("E-Mail zum Zurücksetzen wurde versendet");
        }
        PasswordCommand::Reset { token, password } => {
            runtime.block_on(backend.api.reset_password(&token, &password))?;
            println!("Passwort geändert");
        }
    }
    Ok(())
}
