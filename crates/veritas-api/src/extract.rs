//! Input preview: turn pasted text, a URL or an uploaded PDF into the text
//! that would be analysed, without calling the model.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/extract` | Body: `{"kind":"text","text":…}` or `{"kind":"url","url":…}` |
//! | `POST` | `/extract/pdf` | Raw PDF body; optional `?filename=` |

use axum::{
  Json,
  extract::{Query, State},
};
use bytes::Bytes;
use serde::Deserialize;
use veritas_core::store::SessionStore;
use veritas_ingest::{Extracted, Input};
use veritas_model::Model;

use crate::{ApiState, error::ApiError};

/// `POST /extract`
pub async fn input<S, M>(
  State(state): State<ApiState<S, M>>,
  Json(input): Json<Input>,
) -> Result<Json<Extracted>, ApiError>
where
  S: SessionStore,
  M: Model,
{
  let extracted = state.ingestor.resolve(input).await?;
  Ok(Json(extracted))
}

#[derive(Debug, Deserialize)]
pub struct PdfParams {
  pub filename: Option<String>,
}

/// `POST /extract/pdf[?filename=<name>]`
pub async fn pdf(
  Query(params): Query<PdfParams>,
  body: Bytes,
) -> Result<Json<Extracted>, ApiError> {
  if body.is_empty() {
    return Err(ApiError::BadRequest("empty upload".to_string()));
  }
  let filename = params.filename.filter(|f| !f.trim().is_empty());
  tracing::debug!(bytes = body.len(), ?filename, "extracting PDF upload");

  let extracted =
    tokio::task::spawn_blocking(move || Extracted::from_pdf(&body, filename))
      .await
      .map_err(|e| ApiError::Internal(format!("PDF task failed: {e}")))??;
  Ok(Json(extracted))
}
