//! `GET /sessions/:id/stats`: dashboard aggregates, computed on read.

use axum::{
  Json,
  extract::{Path, State},
};
use uuid::Uuid;
use veritas_core::{stats::DashboardStats, store::SessionStore};
use veritas_model::Model;

use crate::{ApiState, error::ApiError, sessions::require_session};

/// `GET /sessions/:id/stats`
pub async fn handler<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: SessionStore,
  M: Model,
{
  require_session(state.store.as_ref(), id).await?;
  let history = state
    .store
    .history(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(DashboardStats::from_history(&history)))
}
