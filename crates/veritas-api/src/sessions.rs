//! Handlers for `/sessions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/sessions` | Optional body: `Settings` |
//! | `GET`    | `/sessions/:id` | 404 if not found |
//! | `PUT`    | `/sessions/:id/settings` | Body: `Settings` |
//! | `DELETE` | `/sessions/:id` | Drops the session's history |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use uuid::Uuid;
use veritas_core::{
  session::{Session, Settings},
  store::SessionStore,
};
use veritas_model::Model;

use crate::{ApiState, error::ApiError};

/// Look up a session, or fail with 404.
pub(crate) async fn require_session<S: SessionStore>(
  store: &S,
  id: Uuid,
) -> Result<Session, ApiError> {
  store
    .get_session(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| veritas_core::Error::SessionNotFound(id).into())
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /sessions`: an empty body opens a session with default settings.
pub async fn create<S, M>(
  State(state): State<ApiState<S, M>>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore,
  M: Model,
{
  let settings = if body.iter().all(u8::is_ascii_whitespace) {
    Settings::default()
  } else {
    serde_json::from_slice(&body)
      .map_err(|e| ApiError::BadRequest(format!("invalid settings: {e}")))?
  };

  let session = state
    .store
    .create_session(settings)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(session_id = %session.session_id, "session opened");
  Ok((StatusCode::CREATED, Json(session)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /sessions/:id`
pub async fn get_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError>
where
  S: SessionStore,
  M: Model,
{
  Ok(Json(require_session(state.store.as_ref(), id).await?))
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// `PUT /sessions/:id/settings`
pub async fn update_settings<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Json(settings): Json<Settings>,
) -> Result<Json<Session>, ApiError>
where
  S: SessionStore,
  M: Model,
{
  require_session(state.store.as_ref(), id).await?;
  let session = state
    .store
    .update_settings(id, settings)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(session))
}

// ─── End ─────────────────────────────────────────────────────────────────────

/// `DELETE /sessions/:id`
pub async fn end<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SessionStore,
  M: Model,
{
  let existed = state
    .store
    .end_session(id)
    .await
    .map_err(ApiError::from_store)?;
  if !existed {
    return Err(veritas_core::Error::SessionNotFound(id).into());
  }
  tracing::info!(session_id = %id, "session ended");
  Ok(StatusCode::NO_CONTENT)
}
