//! The `SessionStore` trait.
//!
//! Implemented by storage backends (e.g. `veritas-store-memory`). Higher
//! layers (`veritas-api`, `veritas-server`) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  history::{History, HistoryPage, HistoryQuery},
  record::{AnalysisRecord, NewAnalysis},
  session::{Session, Settings},
};

/// Abstraction over a session/history backend.
///
/// Every operation that names a session fails if that session does not exist.
/// Records are append-only; deletion is the only other mutation.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Open a new, empty session.
  fn create_session(
    &self,
    settings: Settings,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Look up a session. Returns `None` if not found.
  fn get_session(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Replace a session's settings and return the updated session.
  fn update_settings(
    &self,
    session_id: Uuid,
    settings: Settings,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Drop a session and its history. Returns `false` if it did not exist.
  fn end_session(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// Append one analysis to the session's history. The store assigns the
  /// record id, excerpt and timestamp.
  fn append(
    &self,
    session_id: Uuid,
    input: NewAnalysis,
  ) -> impl Future<Output = Result<AnalysisRecord, Self::Error>> + Send + '_;

  /// Records matching `query`, in append order, together with the size of
  /// the unfiltered history. Both are read from the same snapshot.
  fn list<'a>(
    &'a self,
    session_id: Uuid,
    query: &'a HistoryQuery,
  ) -> impl Future<Output = Result<HistoryPage, Self::Error>> + Send + 'a;

  fn get_record(
    &self,
    session_id: Uuid,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Option<AnalysisRecord>, Self::Error>> + Send + '_;

  /// Delete one record. Returns `false` if it was not in the history.
  fn delete_record(
    &self,
    session_id: Uuid,
    record_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every record; returns how many were removed.
  fn clear(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// A snapshot of the full history, for statistics and export.
  fn history(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<History, Self::Error>> + Send + '_;
}
