//! `contacts`: terminal UI for the contacts API.
//!
//! # Usage
//!
//! ```
//! contacts --url http://localhost:5232
//! contacts --config ~/.config/contacts/config.toml --log-file /tmp/contacts.log
//! contacts list
//! contacts search ann
//! ```

mod app;
mod client;
mod toast;
mod ui;

use std::{
  fs::File,
  io,
  path::PathBuf,
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use contacts_core::{
  contact::Contact,
  query::{QueryClient, QueryOptions},
  service::ContactService,
};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use toast::Toasts;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "contacts", about = "Terminal UI for the contacts API")]
struct Args {
  /// Path to a TOML config file (url, retry).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the contacts server (default: http://localhost:5232).
  #[arg(long, env = "CONTACTS_URL")]
  url: Option<String>,

  /// Extra attempts a failed read gets (default: 1).
  #[arg(long)]
  retry: Option<u32>,

  /// Write logs here. The TUI logs nowhere otherwise.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print every contact, newest first.
  List,
  /// Print contacts whose name, email, or phone contains QUERY.
  Search { query: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  retry: Option<u32>,
}

/// Connection and query settings after layering flags over the file over
/// defaults.
#[derive(Debug)]
struct Settings {
  api:   ApiConfig,
  query: QueryOptions,
}

fn resolve(args: &Args, file_cfg: ConfigFile) -> Settings {
  let base_url = args
    .url
    .clone()
    .or_else(|| (!file_cfg.url.is_empty()).then_some(file_cfg.url))
    .unwrap_or_else(|| "http://localhost:5232".to_string());
  let retry = args
    .retry
    .or(file_cfg.retry)
    .unwrap_or(QueryOptions::default().retry);
  Settings { api: ApiConfig { base_url }, query: QueryOptions { retry } }
}

// ─── Logging ──────────────────────────────────────────────────────────────────

fn env_filter() -> EnvFilter {
  EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy()
}

/// The TUI owns the terminal, so it only logs when given a file.
fn init_tui_logging(path: Option<&PathBuf>) -> Result<()> {
  if let Some(path) = path {
    let file = File::create(path)
      .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
      .with_env_filter(env_filter())
      .with_writer(Mutex::new(file))
      .with_ansi(false)
      .init();
  }
  Ok(())
}

fn init_stderr_logging() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };
  let settings = resolve(&args, file_cfg);

  match &args.command {
    Some(_) => init_stderr_logging(),
    None => init_tui_logging(args.log_file.as_ref())?,
  }

  let toasts = Arc::new(Toasts::default());
  let client = ApiClient::new(settings.api)?;
  let query = Arc::new(QueryClient::new(
    Arc::new(ContactService::new(client)),
    toasts.clone(),
    settings.query,
  ));

  match args.command {
    Some(Command::List) => {
      let contacts = query
        .contacts()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
      print_contacts(&contacts);
      Ok(())
    }
    Some(Command::Search { query: text }) => {
      let found = query
        .search(&text)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?
        .unwrap_or_default();
      print_contacts(&found);
      Ok(())
    }
    None => run_tui(App::new(query, toasts)).await,
  }
}

fn print_contacts(contacts: &[Contact]) {
  if contacts.is_empty() {
    println!("No contacts found");
    return;
  }
  println!("{:<30} {:<40} {}", "NAME", "EMAIL", "PHONE");
  for c in contacts {
    println!("{:<30} {:<40} {}", c.name, c.email, c.phone);
  }
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_tui(mut app: App<ApiClient>) -> Result<()> {
  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.load();
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<ApiClient>,
) -> Result<()> {
  loop {
    // Apply finished requests, then pick up cache changes made by
    // invalidation refetches.
    app.drain_events();
    app.refresh();

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}
