//! Handlers for a session's analysis history.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/sessions/:id/analyses` | Body: `{"text":…, "source"?:…}`; calls the model |
//! | `GET`    | `/sessions/:id/analyses` | Optional `?verdict=fake\|real\|uncertain&search=<term>` |
//! | `DELETE` | `/sessions/:id/analyses` | Clears the history |
//! | `GET`    | `/sessions/:id/analyses/:record_id` | 404 if not found |
//! | `DELETE` | `/sessions/:id/analyses/:record_id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use veritas_core::{
  history::{HistoryPage, HistoryQuery},
  record::{AnalysisRecord, NewAnalysis, Source, Verdict},
  store::SessionStore,
  text::is_blank,
};
use veritas_model::Model;

use crate::{ApiState, error::ApiError, sessions::require_session};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
  pub text:   String,
  #[serde(default)]
  pub source: Source,
}

/// `POST /sessions/:id/analyses`
///
/// Runs one model call in the session's language. Only a successful analysis
/// is appended; every failure leaves the history untouched.
pub async fn create<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AnalyzeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore,
  M: Model,
{
  let session = require_session(state.store.as_ref(), id).await?;
  if is_blank(&body.text) {
    return Err(veritas_ingest::Error::EmptyText.into());
  }

  let language = session.settings.language;
  let assessment = veritas_model::analyze(state.model.as_ref(), &body.text, language)
    .await
    .inspect_err(|e| tracing::warn!(session_id = %id, error = %e, "analysis failed"))?;

  let record = state
    .store
    .append(id, NewAnalysis {
      full_text: body.text,
      source: body.source,
      assessment,
      language,
      model: state.model.name().to_string(),
    })
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(
    session_id = %id,
    record_id = %record.record_id,
    verdict = %record.verdict,
    score = record.score,
    "analysis recorded"
  );
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// A verdict name, any case; `all` or empty means no filter.
  pub verdict: Option<String>,
  pub search:  Option<String>,
}

impl ListParams {
  fn into_query(self) -> Result<HistoryQuery, ApiError> {
    let verdict = match self.verdict.as_deref().map(str::trim) {
      None | Some("") => None,
      Some(v) if v.eq_ignore_ascii_case("all") => None,
      Some(v) => Some(
        v.parse::<Verdict>()
          .map_err(|_| ApiError::BadRequest(format!("unknown verdict {v:?}")))?,
      ),
    };
    Ok(HistoryQuery { verdict, search: self.search })
  }
}

/// `GET /sessions/:id/analyses[?verdict=<v>&search=<term>]`
pub async fn list<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<HistoryPage>, ApiError>
where
  S: SessionStore,
  M: Model,
{
  require_session(state.store.as_ref(), id).await?;
  let query = params.into_query()?;

  let page = state
    .store
    .list(id, &query)
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(page))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /sessions/:id/analyses/:record_id`
pub async fn get_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path((id, record_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AnalysisRecord>, ApiError>
where
  S: SessionStore,
  M: Model,
{
  require_session(state.store.as_ref(), id).await?;
  let record = state
    .store
    .get_record(id, record_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(veritas_core::Error::RecordNotFound(record_id))?;
  Ok(Json(record))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /sessions/:id/analyses/:record_id`
pub async fn delete_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path((id, record_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: SessionStore,
  M: Model,
{
  require_session(state.store.as_ref(), id).await?;
  let removed = state
    .store
    .delete_record(id, record_id)
    .await
    .map_err(ApiError::from_store)?;
  if !removed {
    return Err(veritas_core::Error::RecordNotFound(record_id).into());
  }
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cleared {
  pub removed: usize,
}

/// `DELETE /sessions/:id/analyses`
pub async fn clear<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Cleared>, ApiError>
where
  S: SessionStore,
  M: Model,
{
  require_session(state.store.as_ref(), id).await?;
  let removed = state
    .store
    .clear(id)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(session_id = %id, removed, "history cleared");
  Ok(Json(Cleared { removed }))
}
