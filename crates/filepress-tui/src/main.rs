use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio_util::sync::CancellationToken;

use filepress_core::config_file::{self, BehaviorConfig, ConfigFile, ServerConfig, Settings};
use filepress_core::prefs::prefs_path;
use filepress_core::{
    AuthGate, DirectorySink, FileManager, Gate, HttpFileApi, Notice, PrefsStore, Session,
    ThemeMode, ThemeStore, TokenStore,
};

mod action;
mod app;
mod dropped;
mod input;
mod logging;
mod notices;
mod theme;
mod view;

use app::App;
use notices::NoticeQueue;

/// How long to wait on exit for deletions and other requests still in flight.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// FilePress terminal client: list, upload, convert and delete your files.
#[derive(Parser, Debug)]
#[command(name = "filepress", version, about, long_about = None)]
struct Args {
    /// Server base URL (default: http://localhost:5000)
    #[arg(long)]
    url: Option<String>,

    /// Bearer token from the login page; saved for later runs
    #[arg(long)]
    token: Option<String>,

    /// Directory converted PDFs are saved to
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Color theme: light or dark
    #[arg(long)]
    theme: Option<String>,

    /// Seconds a deletion can be undone before it is sent
    #[arg(long)]
    grace_secs: Option<u64>,
}

/// Build a config layer from CLI flags or environment variables so it can be
/// merged over the file config like any other layer.
fn overlay(url: Option<String>, download_dir: Option<String>, grace: Option<u64>) -> ConfigFile {
    ConfigFile {
        server: Some(ServerConfig {
            base_url: url,
            ..Default::default()
        }),
        behavior: Some(BehaviorConfig {
            undo_grace_secs: grace,
            download_dir,
        }),
        display: None,
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = logging::init()?;

    // Resolve settings: CLI flags > env vars > CWD config > platform config > defaults
    let file_cfg = config_file::load_config();
    let env_cfg = overlay(
        env_var("FILEPRESS_URL"),
        env_var("FILEPRESS_DOWNLOAD_DIR"),
        None,
    );
    let cli_cfg = overlay(
        args.url.clone(),
        args.download_dir.as_ref().map(|p| p.display().to_string()),
        args.grace_secs,
    );
    let settings = Settings::from_file(&config_file::merge(
        config_file::merge(file_cfg, env_cfg),
        cli_cfg,
    ));
    tracing::info!(
        base_url = %settings.base_url,
        grace_secs = settings.undo_grace.as_secs(),
        "settings resolved"
    );

    let prefs = Arc::new(PrefsStore::open(
        prefs_path().unwrap_or_else(|| PathBuf::from(".filepress-prefs.json")),
    ));
    if let Some(token) = &args.token {
        prefs.set_token(token)?;
    }

    // An env token is used for this run only and never written to disk.
    let gate = match env_var("FILEPRESS_TOKEN") {
        Some(token) => Gate::Authenticated(token),
        None => AuthGate::check(prefs.as_ref(), &settings.login_url),
    };
    let token = match gate {
        Gate::Authenticated(token) => token,
        Gate::Redirect(login_url) => {
            tracing::info!(%login_url, "no stored token, redirecting to login");
            println!("Not logged in. Sign in at {login_url}");
            println!("then run: filepress --token <TOKEN>");
            return Ok(());
        }
    };

    let session = Arc::new(Session::new(&settings.base_url, token));
    let api = Arc::new(HttpFileApi::new(session.clone(), settings.timeout)?);
    let downloads = match &settings.download_dir {
        Some(dir) => DirectorySink::new(dir),
        None => DirectorySink::platform_default(),
    };
    let notices = Arc::new(NoticeQueue::default());
    let (manager, mut events) = FileManager::new(
        api,
        Arc::new(downloads),
        notices.clone(),
        settings.undo_grace,
    );

    // Theme: CLI flag > saved preference > config file > light
    let mode = args
        .theme
        .as_deref()
        .and_then(ThemeMode::parse)
        .or_else(|| prefs.theme())
        .or_else(|| settings.theme.as_deref().and_then(ThemeMode::parse))
        .unwrap_or_default();

    let mut app = App::new(
        manager,
        prefs.clone(),
        notices,
        theme::Theme::for_mode(mode),
        session.base_url(),
    );
    app.manager.fetch_files();

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        original_hook(panic_info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    let tick_rate = Duration::from_millis(1000 / u64::from(settings.fps));

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            Some(client_event) = events.recv() => {
                app.handle_client_event(client_event);
                while let Ok(evt) = events.try_recv() {
                    app.handle_client_event(evt);
                }
            }
            _ = cancel.cancelled() => {
                app.should_quit = true;
            }
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    app.update(input::map_event(&evt));
                }
            } => {}
        }

        app.update(action::Action::Tick);

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;

    // Confirmed deletions still in their undo window are sent now.
    let flushed = app.manager.flush_deletions();
    if app.manager.inflight() > 0 {
        if flushed > 0 {
            eprintln!("Sending {flushed} pending deletion(s)\u{2026}");
        }
        let deadline = tokio::time::sleep(SHUTDOWN_GRACE);
        tokio::pin!(deadline);
        while app.manager.inflight() > 0 {
            tokio::select! {
                Some(evt) = events.recv() => app.handle_client_event(evt),
                _ = &mut deadline => {
                    tracing::warn!(inflight = app.manager.inflight(), "gave up waiting for requests");
                    break;
                }
            }
        }
    }
    for notice in app.notices.drain() {
        if let Notice::DeleteFailed { filename, message } = notice {
            eprintln!("Could not delete {filename}: {message}");
        }
    }

    if app.logout_requested {
        filepress_core::logout(&session, prefs.as_ref())?;
        println!("Logged out. Sign in again at {}", settings.login_url);
    }

    tracing::info!("filepress exiting");
    Ok(())
}
