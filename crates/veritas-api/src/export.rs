//! `GET /sessions/:id/export[?format=csv|json]`: the whole history as a
//! file download. JSON is the default.

use axum::{
  extract::{Path, Query, State},
  http::header,
  response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use veritas_core::{export::ExportFormat, store::SessionStore};
use veritas_model::Model;

use crate::{ApiState, error::ApiError, sessions::require_session};

#[derive(Debug, Deserialize)]
pub struct ExportParams {
  pub format: Option<String>,
}

/// `GET /sessions/:id/export`
pub async fn handler<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore,
  M: Model,
{
  let format = match params.format.as_deref() {
    None => ExportFormat::default(),
    Some(f) => ExportFormat::parse(f)?,
  };

  require_session(state.store.as_ref(), id).await?;
  let history = state
    .store
    .history(id)
    .await
    .map_err(ApiError::from_store)?;

  let body = format.render(history.records())?;
  let file_name = format.file_name(Utc::now());
  tracing::debug!(session_id = %id, %format, records = history.len(), "export rendered");

  Ok((
    [
      (header::CONTENT_TYPE, format.mime_type().to_string()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{file_name}\""),
      ),
    ],
    body,
  ))
}
