//! Server assembly for Veritas: configuration and the top-level router.
//!
//! The binary in `main.rs` wires these together with a [`MemoryStore`] and a
//! [`GeminiClient`](veritas_model::GeminiClient).
//!
//! [`MemoryStore`]: veritas_store_memory::MemoryStore

use std::{path::Path, time::Duration};

use axum::{Router, extract::DefaultBodyLimit};
use config::{ConfigError, Environment, File, Source};
use serde::Deserialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tower_http::trace::TraceLayer;
use veritas_api::{ApiState, AuthConfig, api_router};
use veritas_core::store::SessionStore;
use veritas_model::{
  GeminiConfig, Model,
  gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL},
};
use veritas_store_memory::MemoryStore;

/// Environment variables consulted, in order, when `api_key` is not set.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `VERITAS_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default)]
  pub api_key:              Option<String>,
  #[serde(default = "default_model")]
  pub model:                String,
  #[serde(default = "default_api_base_url")]
  pub api_base_url:         String,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
  #[serde(default = "default_fetch_timeout_secs")]
  pub fetch_timeout_secs:   u64,
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes:     usize,
  /// Sessions untouched for this long are dropped; `0` keeps them forever.
  #[serde(default = "default_session_idle_secs")]
  pub session_idle_secs:    u64,
  #[serde(default)]
  pub auth_username:        Option<String>,
  #[serde(default)]
  pub auth_password_hash:   Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_api_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_request_timeout_secs() -> u64 { 60 }
fn default_fetch_timeout_secs() -> u64 { 20 }
fn default_max_upload_bytes() -> usize { 20 * 1024 * 1024 }
fn default_session_idle_secs() -> u64 { 3600 }

/// Upper bound on the gap between idle-session sweeps.
const MAX_REAP_INTERVAL: Duration = Duration::from_secs(60);

impl ServerConfig {
  /// Read `path` (optional) and `VERITAS_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_source(File::from(path).required(false))
  }

  fn from_source(file: impl Source + Send + Sync + 'static) -> Result<Self, ConfigError> {
    config::Config::builder()
      .add_source(file)
      .add_source(Environment::with_prefix("VERITAS").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  /// Fill in `api_key` from the first of [`API_KEY_ENV_VARS`] that `lookup`
  /// finds, unless the config already set one.
  pub fn with_api_key_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    let configured = self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
    if !configured {
      self.api_key = API_KEY_ENV_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()));
    }
    self
  }

  /// Basic-auth credentials, when both halves are configured.
  pub fn auth(&self) -> Option<AuthConfig> {
    match (&self.auth_username, &self.auth_password_hash) {
      (Some(username), Some(password_hash)) => Some(AuthConfig {
        username:      username.clone(),
        password_hash: password_hash.clone(),
      }),
      _ => None,
    }
  }

  pub fn gemini_config(&self) -> GeminiConfig {
    GeminiConfig {
      api_key: self.api_key.clone(),
      model: self.model.clone(),
      base_url: self.api_base_url.clone(),
      timeout: Duration::from_secs(self.request_timeout_secs),
      ..GeminiConfig::default()
    }
  }

  pub fn fetch_timeout(&self) -> Duration { Duration::from_secs(self.fetch_timeout_secs) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// How long a session may sit unused, or `None` when reaping is off.
  pub fn session_idle(&self) -> Option<Duration> {
    (self.session_idle_secs > 0).then(|| Duration::from_secs(self.session_idle_secs))
  }
}

// ─── Session reaper ──────────────────────────────────────────────────────────

/// Sweep `store` every `every`, dropping sessions idle for longer than `idle`.
pub fn spawn_session_reaper(
  store: MemoryStore,
  idle: Duration,
  every: Duration,
) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      let reaped = store.reap_idle(idle).await;
      if reaped > 0 {
        tracing::info!(reaped, "dropped idle sessions");
      }
    }
  })
}

/// Sweep often enough that a session outlives `idle` by at most a minute.
pub fn reap_interval(idle: Duration) -> Duration { idle.min(MAX_REAP_INTERVAL) }

// ─── Router ──────────────────────────────────────────────────────────────────

/// The full application: the API under `/api`, request tracing, and a body
/// limit sized for PDF uploads.
pub fn app<S, M>(
  state: ApiState<S, M>,
  auth: Option<AuthConfig>,
  max_upload_bytes: usize,
) -> Router
where
  S: SessionStore + 'static,
  M: Model + 'static,
{
  Router::new()
    .nest("/api", api_router(state, auth))
    .layer(DefaultBodyLimit::max(max_upload_bytes))
    .layer(TraceLayer::new_for_http())
}
