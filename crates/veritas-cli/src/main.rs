//! `veritas`: terminal UI for the Veritas fake-news detector.
//!
//! # Usage
//!
//! ```
//! veritas --url http://localhost:8080 --user alice --password secret
//! veritas --config ~/.config/veritas/config.toml --log-file veritas.log
//! ```

mod app;
mod client;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result};
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
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "veritas", about = "Terminal UI for the Veritas fake-news detector")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the veritas server (default: http://localhost:8080).
  #[arg(long, env = "VERITAS_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "VERITAS_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "VERITAS_PASSWORD")]
  password: Option<String>,

  /// Write logs to this file. The terminal is owned by the UI, so nothing
  /// is logged without it.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

fn pick(flag: Option<String>, file: &str) -> Option<String> {
  flag.or_else(|| (!file.is_empty()).then(|| file.to_string()))
}

fn init_logging(path: &Path) -> Result<()> {
  let file = std::fs::File::create(path)
    .with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(Arc::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: pick(args.url, &file_cfg.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
    username: pick(args.user, &file_cfg.username).unwrap_or_default(),
    password: pick(args.password, &file_cfg.password).unwrap_or_default(),
  };
  tracing::info!(url = %api_config.base_url, "starting");

  let client = ApiClient::new(api_config)?;
  let mut app = App::new(client);

  // Fail before touching the terminal if the server is unreachable.
  app.start().await.context("connecting to the veritas server")?;

  // From here on the session must be ended on every exit path.
  let mut terminal = match setup_terminal() {
    Ok(terminal) => terminal,
    Err(e) => {
      restore_terminal();
      return Err(app.abandon(e).await);
    }
  };

  app.perform(app::Action::Refresh).await;
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  restore_terminal();
  terminal.show_cursor().ok();

  app.shutdown().await;
  run_result
}

// ─── Terminal ─────────────────────────────────────────────────────────────────

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn setup_terminal() -> Result<Tui> {
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")
}

fn restore_terminal() {
  disable_raw_mode().ok();
  let mut stdout = io::stdout();
  execute!(stdout, LeaveAlternateScreen).ok();
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
  loop {
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
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_override_config_file() {
    assert_eq!(pick(Some("a".into()), "b").as_deref(), Some("a"));
    assert_eq!(pick(None, "b").as_deref(), Some("b"));
    assert_eq!(pick(None, ""), None);
  }

  #[test]
  fn config_file_fields_are_optional() {
    let cfg: ConfigFile = toml::from_str(r#"url = "http://example:9000""#).unwrap();
    assert_eq!(cfg.url, "http://example:9000");
    assert!(cfg.username.is_empty());
  }
}
