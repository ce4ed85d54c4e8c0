//! veritas-server binary.
//!
//! Reads `.env`, then `config.toml` (or the path given with `--config`) and
//! `VERITAS_*` environment variables, and serves the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash`:
//!
//! ```
//! cargo run -p veritas-server -- --hash-password
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use veritas_api::ApiState;
use veritas_ingest::Ingestor;
use veritas_model::{GeminiClient, Model as _};
use veritas_server::{ServerConfig, reap_interval, spawn_session_reaper};
use veritas_store_memory::MemoryStore;

#[derive(Parser)]
#[command(author, version, about = "Veritas fake-news detection server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // A missing .env is normal.
  let dotenv = dotenvy::dotenv();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  if let Ok(path) = &dotenv {
    tracing::debug!(path = %path.display(), "loaded environment file");
  }

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let server_cfg = ServerConfig::load(&cli.config)
    .context("failed to read configuration")?
    .with_api_key_from(|var| std::env::var(var).ok());

  let model =
    GeminiClient::new(server_cfg.gemini_config()).context("failed to build model client")?;
  if !model.is_configured() {
    tracing::warn!(
      "no API key configured (set api_key, GEMINI_API_KEY or GOOGLE_API_KEY); \
       analyses will fail until one is provided"
    );
  }

  let ingestor =
    Ingestor::new(server_cfg.fetch_timeout()).context("failed to build article fetcher")?;

  let auth = server_cfg.auth();
  if auth.is_none() {
    tracing::info!("HTTP Basic auth disabled");
  }

  let store = MemoryStore::new();
  match server_cfg.session_idle() {
    Some(idle) => {
      tracing::info!(idle_secs = idle.as_secs(), "idle sessions will be dropped");
      spawn_session_reaper(store.clone(), idle, reap_interval(idle));
    }
    None => tracing::info!("idle session reaping disabled"),
  }

  let state = ApiState {
    store: Arc::new(store),
    model: Arc::new(model),
    ingestor,
  };

  let app = veritas_server::app(state, auth, server_cfg.max_upload_bytes);
  let address = server_cfg.address();

  tracing::info!(model = %server_cfg.model, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
