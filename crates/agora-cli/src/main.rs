//! `agora`: terminal client for the Agora Q&A forum.
//!
//! # Usage
//!
//! ```
//! agora --url https://<project>.supabase.co --anon-key <key>
//! agora --local ./agora.db --email ada@example.com
//! agora --config ~/.config/agora/config.toml --route /question/<id>
//! ```

mod app;
mod client;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use agora_core::{backend::ForumBackend, route::Route};
use agora_store_sqlite::SqliteBackend;
use anyhow::{Context, Result, bail};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "agora", about = "Terminal client for the Agora Q&A forum")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the hosted project.
  #[arg(long, env = "AGORA_URL")]
  url: Option<String>,

  /// Public (anon) API key of the hosted project.
  #[arg(long, env = "AGORA_ANON_KEY")]
  anon_key: Option<String>,

  /// Use a local SQLite database instead of the hosted project.
  #[arg(long, env = "AGORA_LOCAL_DB", value_name = "PATH")]
  local: Option<PathBuf>,

  /// Pre-fill the login form with this email.
  #[arg(long, env = "AGORA_EMAIL")]
  email: Option<String>,

  /// Route to open once signed in, e.g. `/question/<id>`.
  #[arg(long, default_value = "/")]
  route: String,

  /// Write logs to this file (the terminal is taken by the UI).
  #[arg(long, env = "AGORA_LOG_FILE", value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  anon_key: String,
  #[serde(default)]
  local_db: Option<PathBuf>,
  #[serde(default)]
  email:    String,
  #[serde(default)]
  log_file: Option<PathBuf>,
}

/// Which backend to talk to, after flags and file are merged.
#[derive(Debug, PartialEq)]
enum Target {
  Local(PathBuf),
  Remote(ApiConfig),
}

/// Fully resolved settings.
#[derive(Debug)]
struct Settings {
  target: Target,
  email:  String,
  route:  Route,
}

fn non_empty(s: String) -> Option<String> { (!s.is_empty()).then_some(s) }

impl Settings {
  /// CLI flags override the config file. A local database wins over a URL.
  fn resolve(args: Args, file: ConfigFile) -> Result<Self> {
    let target = match args.local.or(file.local_db) {
      Some(path) => Target::Local(path),
      None => {
        let Some(base_url) = args.url.or_else(|| non_empty(file.url)) else {
          bail!("no backend configured: pass --url (or AGORA_URL) or --local");
        };
        let anon_key = args
          .anon_key
          .or_else(|| non_empty(file.anon_key))
          .context("--anon-key (or AGORA_ANON_KEY) is required with --url")?;
        Target::Remote(ApiConfig { base_url, anon_key })
      }
    };

    // A malformed question id is reported, then treated like any other
    // unknown path.
    let route = Route::parse(&args.route).unwrap_or_else(|e| {
      warn!(route = %args.route, error = %e, "ignoring --route");
      Route::Catalog
    });

    Ok(Self {
      target,
      email: args.email.or_else(|| non_empty(file.email)).unwrap_or_default(),
      route,
    })
  }
}

fn load_config_file(path: Option<&Path>) -> Result<ConfigFile> {
  let Some(path) = path else {
    return Ok(ConfigFile::default());
  };
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

/// Send tracing output to `path`; without a path, logs are dropped.
fn init_logging(path: Option<&Path>) -> Result<()> {
  let Some(path) = path else {
    return Ok(());
  };
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let file_cfg = load_config_file(args.config.as_deref())?;
  init_logging(args.log_file.as_deref().or(file_cfg.log_file.as_deref()))?;
  let settings = Settings::resolve(args, file_cfg)?;

  match settings.target {
    Target::Local(path) => {
      info!(path = %path.display(), "using local database");
      let backend = SqliteBackend::open(&path)
        .await
        .with_context(|| format!("opening database {}", path.display()))?;
      run(App::new(backend, settings.route, settings.email)).await
    }
    Target::Remote(config) => {
      info!(url = %config.base_url, "using hosted backend");
      let client = ApiClient::new(config)?;
      run(App::new(client, settings.route, settings.email)).await
    }
  }
}

async fn run<B: ForumBackend + 'static>(mut app: App<B>) -> Result<()> {
  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Draw the loading frame before resolving the session.
  let run_result = match terminal.draw(|f| ui::draw(f, &app)) {
    Ok(_) => {
      app.start().await;
      run_event_loop(&mut terminal, &mut app).await
    }
    Err(e) => Err(anyhow::Error::new(e).context("drawing frame")),
  };
  app.shutdown();

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop<B: ForumBackend + 'static>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<B>,
) -> Result<()> {
  loop {
    app.sync_session().await;
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if !app.handle_key(key).await? {
        break;
      }
    }
  }

  Ok(())
}
