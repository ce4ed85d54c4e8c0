//! JSON REST API for Veritas.
//!
//! Exposes an axum [`Router`] backed by any
//! [`veritas_core::store::SessionStore`] and any [`veritas_model::Model`].
//! TLS and transport concerns are the caller's responsibility; HTTP Basic
//! auth is applied when an [`AuthConfig`] is supplied.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", veritas_api::api_router(state, auth))
//! ```

pub mod analyses;
pub mod auth;
pub mod error;
pub mod export;
pub mod extract;
pub mod sessions;
pub mod stats;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::State,
  middleware,
  routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use veritas_core::store::SessionStore;
use veritas_ingest::Ingestor;
use veritas_model::Model;

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, M> {
  pub store:    Arc<S>,
  pub model:    Arc<M>,
  pub ingestor: Ingestor,
}

impl<S, M> Clone for ApiState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      model:    self.model.clone(),
      ingestor: self.ingestor.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(state: ApiState<S, M>, auth: Option<AuthConfig>) -> Router<()>
where
  S: SessionStore + 'static,
  M: Model + 'static,
{
  let router = Router::new()
    .route("/health", get(health::<S, M>))
    // Sessions
    .route("/sessions", post(sessions::create::<S, M>))
    .route(
      "/sessions/{id}",
      get(sessions::get_one::<S, M>).delete(sessions::end::<S, M>),
    )
    .route("/sessions/{id}/settings", put(sessions::update_settings::<S, M>))
    // Input preview
    .route("/extract", post(extract::input::<S, M>))
    .route("/extract/pdf", post(extract::pdf))
    // History
    .route(
      "/sessions/{id}/analyses",
      get(analyses::list::<S, M>)
        .post(analyses::create::<S, M>)
        .delete(analyses::clear::<S, M>),
    )
    .route(
      "/sessions/{id}/analyses/{record_id}",
      get(analyses::get_one::<S, M>).delete(analyses::delete_one::<S, M>),
    )
    // Dashboard and downloads
    .route("/sessions/{id}/stats", get(stats::handler::<S, M>))
    .route("/sessions/{id}/export", get(export::handler::<S, M>))
    .with_state(state);

  match auth {
    Some(config) => router.layer(middleware::from_fn_with_state(
      Arc::new(config),
      auth::require_auth,
    )),
    None => router,
  }
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
  pub status:             String,
  pub model:              String,
  pub api_key_configured: bool,
}

/// `GET /health`
pub async fn health<S, M>(State(state): State<ApiState<S, M>>) -> Json<Health>
where
  S: SessionStore,
  M: Model,
{
  Json(Health {
    status:             "ok".to_string(),
    model:              state.model.name().to_string(),
    api_key_configured: state.model.is_configured(),
  })
}

#[cfg(test)]
mod tests;
